use api_shared::ReviewCreateReq;
use sns_types::{BookingStatus, Rating};
use sqlx::PgPool;

use crate::models::{new_id, ReviewRow, UserRow};
use crate::repositories::bookings::BOOKING_NOT_FOUND;
use crate::repositories::is_unique_violation;
use crate::{CoreError, CoreResult};

const MAX_COMMENT_LEN: usize = 500;

#[derive(Clone, Debug)]
pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Review the other party of a completed booking. One review per reviewer and booking.
    pub async fn create(&self, reviewer: &UserRow, req: &ReviewCreateReq) -> CoreResult<ReviewRow> {
        let booking = sqlx::query_as::<_, crate::models::BookingRow>(
            "SELECT * FROM bookings WHERE id = $1",
        )
        .bind(&req.booking_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::not_found(BOOKING_NOT_FOUND))?;

        if booking.status()? != BookingStatus::Completed {
            return Err(CoreError::invalid("Can only review completed bookings"));
        }
        let reviewee_id = match booking.counterpart(&reviewer.id) {
            Some(other) if booking.is_party(&reviewer.id) => other.to_owned(),
            _ => {
                return Err(CoreError::forbidden(
                    "Not authorized to review this booking",
                ))
            }
        };

        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE booking_id = $1 AND reviewer_id = $2)",
        )
        .bind(&booking.id)
        .bind(&reviewer.id)
        .fetch_one(&self.pool)
        .await?;
        if already {
            return Err(CoreError::invalid("Already reviewed this booking"));
        }

        let rating = Rating::new(req.rating)?;
        if let Some(comment) = &req.comment {
            if comment.chars().count() > MAX_COMMENT_LEN {
                return Err(CoreError::invalid(format!(
                    "Comment exceeds maximum length of {MAX_COMMENT_LEN} characters"
                )));
            }
        }

        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO reviews (id, booking_id, reviewer_id, reviewee_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *, $7::varchar AS reviewer_name",
        )
        .bind(new_id())
        .bind(&booking.id)
        .bind(&reviewer.id)
        .bind(&reviewee_id)
        .bind(i32::from(rating))
        .bind(req.comment.as_deref())
        .bind(&reviewer.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::invalid("Already reviewed this booking")
            } else {
                e.into()
            }
        })?;

        tracing::info!(review_id = %row.id, reviewee = %reviewee_id, rating = row.rating, "review submitted");
        Ok(row)
    }

    /// Reviews received by `user_id`, newest first.
    pub async fn received_by(&self, user_id: &str) -> CoreResult<Vec<ReviewRow>> {
        Ok(sqlx::query_as::<_, ReviewRow>(
            "SELECT r.*, u.full_name AS reviewer_name
             FROM reviews r
             LEFT JOIN users u ON u.id = r.reviewer_id
             WHERE r.reviewee_id = $1
             ORDER BY r.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
