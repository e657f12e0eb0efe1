//! Service requests posted by customers, and matching professionals against them.

use api_shared::{ProProfileRes, ServiceRequestCreateReq, ServiceRequestUpdateReq};
use sns_types::{NonEmptyText, RequestStatus};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::matching::{self, MatchInput};
use crate::models::{new_id, ServiceRequestRow};
use crate::repositories::categories::CategoryService;
use crate::repositories::users::UserService;
use crate::{CoreError, CoreResult};

const MAX_TITLE_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 255;

pub const REQUEST_NOT_FOUND: &str = "Request not found";

#[derive(Clone, Debug)]
pub struct RequestService {
    pool: PgPool,
}

impl RequestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Post a new open request for `customer_id`.
    pub async fn create(
        &self,
        customer_id: &str,
        req: &ServiceRequestCreateReq,
    ) -> CoreResult<ServiceRequestRow> {
        let title = NonEmptyText::bounded(&req.title, MAX_TITLE_LEN)?;
        let description = NonEmptyText::new(&req.description)?;
        let location = NonEmptyText::bounded(&req.location, MAX_LOCATION_LEN)?;
        if !CategoryService::new(self.pool.clone())
            .exists(&req.category_id)
            .await?
        {
            return Err(CoreError::invalid(format!(
                "Unknown service category: {}",
                req.category_id
            )));
        }

        let row = sqlx::query_as::<_, ServiceRequestRow>(
            "INSERT INTO service_requests
                (id, customer_id, category_id, title, description, photos, location,
                 latitude, longitude, scheduled_at, urgency, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *",
        )
        .bind(new_id())
        .bind(customer_id)
        .bind(&req.category_id)
        .bind(title.as_str())
        .bind(description.as_str())
        .bind(Json(&req.photos))
        .bind(location.as_str())
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.scheduled_at)
        .bind(req.urgency.as_str())
        .bind(RequestStatus::Open.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(request_id = %row.id, category = %row.category_id, "service request created");
        Ok(row)
    }

    pub async fn list_for_customer(&self, customer_id: &str) -> CoreResult<Vec<ServiceRequestRow>> {
        Ok(sqlx::query_as::<_, ServiceRequestRow>(
            "SELECT * FROM service_requests WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Open requests, newest first, optionally within one category.
    pub async fn list_open(&self, category: Option<&str>) -> CoreResult<Vec<ServiceRequestRow>> {
        Ok(sqlx::query_as::<_, ServiceRequestRow>(
            "SELECT * FROM service_requests
             WHERE status = 'open' AND ($1::text IS NULL OR category_id = $1)
             ORDER BY created_at DESC",
        )
        .bind(category.filter(|c| !c.is_empty()))
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn find(&self, id: &str) -> CoreResult<Option<ServiceRequestRow>> {
        Ok(
            sqlx::query_as::<_, ServiceRequestRow>("SELECT * FROM service_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn require(&self, id: &str) -> CoreResult<ServiceRequestRow> {
        self.find(id)
            .await?
            .ok_or_else(|| CoreError::not_found(REQUEST_NOT_FOUND))
    }

    /// Apply a partial update. Only the request's customer may change it.
    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        update: &ServiceRequestUpdateReq,
    ) -> CoreResult<ServiceRequestRow> {
        let existing = self.require(id).await?;
        if existing.customer_id != user_id {
            return Err(CoreError::forbidden("Not authorized"));
        }
        if let Some(title) = &update.title {
            NonEmptyText::bounded(title, MAX_TITLE_LEN)?;
        }
        if let Some(description) = &update.description {
            NonEmptyText::new(description)?;
        }
        if let Some(location) = &update.location {
            NonEmptyText::bounded(location, MAX_LOCATION_LEN)?;
        }

        Ok(sqlx::query_as::<_, ServiceRequestRow>(
            "UPDATE service_requests SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                photos = COALESCE($4, photos),
                location = COALESCE($5, location),
                latitude = CASE WHEN $6 THEN $7 ELSE latitude END,
                longitude = CASE WHEN $8 THEN $9 ELSE longitude END,
                scheduled_at = CASE WHEN $10 THEN $11 ELSE scheduled_at END,
                urgency = COALESCE($12, urgency),
                status = COALESCE($13, status),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(update.title.as_deref().map(str::trim))
        .bind(update.description.as_deref().map(str::trim))
        .bind(update.photos.as_ref().map(Json))
        .bind(update.location.as_deref().map(str::trim))
        .bind(update.latitude.is_some())
        .bind(update.latitude.flatten())
        .bind(update.longitude.is_some())
        .bind(update.longitude.flatten())
        .bind(update.scheduled_at.is_some())
        .bind(update.scheduled_at.flatten())
        .bind(update.urgency.map(|u| u.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?)
    }

    /// Active professionals in the request's category, best match first.
    pub async fn matches(&self, id: &str) -> CoreResult<Vec<ProProfileRes>> {
        let request = self.require(id).await?;
        let users = UserService::new(self.pool.clone());
        let pros = users.active_pros_in_category(&request.category_id).await?;

        let request_text = if request.description.trim().is_empty() {
            request.title.as_str()
        } else {
            request.description.as_str()
        };

        let mut profiles = Vec::with_capacity(pros.len());
        for pro in pros {
            let (avg_rating, reviews_count) = users.rating_summary(&pro.id).await?;
            let jobs_completed = users.jobs_completed(&pro.id).await?;
            let open_slots: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM availability WHERE professional_id = $1 AND NOT is_booked",
            )
            .bind(&pro.id)
            .fetch_one(&self.pool)
            .await?;

            let outcome = matching::score(&MatchInput {
                request_text,
                bio: pro.bio.as_deref(),
                avg_rating,
                open_slots,
                jobs_completed,
            });

            let mut profile = pro.into_profile(crate::models::ProStats {
                rating: matching::round1(avg_rating),
                jobs_completed,
                reviews_count,
            });
            profile.match_score = Some(outcome.score);
            profile.match_reason = Some(outcome.reason);
            profiles.push(profile);
        }

        matching::rank(&mut profiles);
        Ok(profiles)
    }
}

/// Set a request's status inside an existing transaction or connection.
pub async fn set_status<'e, E>(executor: E, id: &str, status: RequestStatus) -> CoreResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE service_requests SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
