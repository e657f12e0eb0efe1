//! Accounts: signup, credential checks, profiles and professional statistics.

use api_shared::{LoginReq, ProProfileRes, SignupReq, UserUpdateReq};
use sns_types::{NonEmptyText, UserRole};
use sqlx::PgPool;

use crate::models::{new_id, ProStats, UserRow};
use crate::repositories::is_unique_violation;
use crate::security::{hash_password_async, verify_password_async};
use crate::{CoreError, CoreResult};

pub const DUPLICATE_USER: &str = "The user with this username already exists in the system.";
pub const BAD_CREDENTIALS: &str = "Incorrect email or password";
pub const INACTIVE_USER: &str = "Inactive user";

const MAX_NAME_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 15;

/// A validated signup ready to be stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Option<String>,
    pub phone: NonEmptyText,
    pub password: String,
    pub full_name: NonEmptyText,
    pub role: UserRole,
    pub service_category: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
}

impl NewUser {
    /// Validate a signup body for `role`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the name, phone or password is blank or too long,
    /// or if a professional does not name a service category.
    pub fn from_signup(req: &SignupReq, role: UserRole) -> CoreResult<Self> {
        let service_category = req
            .service_category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);
        if role == UserRole::Pro && service_category.is_none() {
            return Err(CoreError::invalid(
                "Professionals must choose a service_category",
            ));
        }

        if req.password.is_empty() {
            return Err(CoreError::invalid("Password cannot be empty"));
        }

        Ok(Self {
            email: req
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_lowercase),
            phone: NonEmptyText::bounded(req.phone.trim(), MAX_PHONE_LEN)?,
            password: req.password.clone(),
            full_name: NonEmptyText::bounded(req.full_name.trim(), MAX_NAME_LEN)?,
            role,
            service_category: if role == UserRole::Pro {
                service_category
            } else {
                None
            },
            bio: req.bio.clone(),
            address: req.address.clone(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: NewUser) -> CoreResult<UserRow> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE phone = $1 OR ($2::text IS NOT NULL AND email = $2))",
        )
        .bind(user.phone.as_str())
        .bind(user.email.as_deref())
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(CoreError::invalid(DUPLICATE_USER));
        }

        let password_hash = hash_password_async(user.password.clone()).await?;
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users
                (id, email, password_hash, full_name, phone, role, service_category, bio, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(new_id())
        .bind(user.email.as_deref())
        .bind(&password_hash)
        .bind(user.full_name.as_str())
        .bind(user.phone.as_str())
        .bind(user.role.as_str())
        .bind(user.service_category.as_deref())
        .bind(user.bio.as_deref())
        .bind(user.address.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::invalid(DUPLICATE_USER)
            } else {
                e.into()
            }
        })?;

        tracing::info!(user_id = %row.id, role = %row.role, "user registered");
        Ok(row)
    }

    pub async fn find(&self, id: &str) -> CoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn require(&self, id: &str) -> CoreResult<UserRow> {
        self.find(id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))
    }

    pub async fn find_by_phone(&self, phone: &str) -> CoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE phone = $1")
            .bind(phone.trim())
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Look a user up by email (case-insensitive) or phone.
    pub async fn find_by_login(&self, identifier: &str) -> CoreResult<Option<UserRow>> {
        let identifier = identifier.trim();
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users WHERE lower(email) = lower($1) OR phone = $1 LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Check a password for the account named by `identifier` (email or phone).
    pub async fn authenticate(&self, identifier: &str, password: &str) -> CoreResult<UserRow> {
        let user = self
            .find_by_login(identifier)
            .await?
            .ok_or_else(|| CoreError::invalid(BAD_CREDENTIALS))?;
        if !verify_password_async(password.to_owned(), user.password_hash.clone()).await? {
            return Err(CoreError::invalid(BAD_CREDENTIALS));
        }
        if !user.is_active {
            return Err(CoreError::invalid(INACTIVE_USER));
        }
        Ok(user)
    }

    pub async fn authenticate_json(&self, req: &LoginReq) -> CoreResult<UserRow> {
        let identifier = req
            .email
            .as_deref()
            .or(req.phone.as_deref())
            .ok_or_else(|| CoreError::invalid(BAD_CREDENTIALS))?;
        self.authenticate(identifier, &req.password).await
    }

    pub async fn update_profile(&self, id: &str, update: &UserUpdateReq) -> CoreResult<UserRow> {
        if let Some(name) = &update.full_name {
            NonEmptyText::bounded(name.trim(), MAX_NAME_LEN)?;
        }
        let email = update
            .email
            .as_ref()
            .map(|e| e.as_deref().map(|e| e.trim().to_lowercase()));

        // Optional columns: `CASE WHEN <present>` so an explicit null clears them.
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                email = CASE WHEN $3 THEN $4 ELSE email END,
                bio = CASE WHEN $5 THEN $6 ELSE bio END,
                address = CASE WHEN $7 THEN $8 ELSE address END,
                profile_photo = CASE WHEN $9 THEN $10 ELSE profile_photo END,
                latitude = CASE WHEN $11 THEN $12 ELSE latitude END,
                longitude = CASE WHEN $13 THEN $14 ELSE longitude END
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(update.full_name.as_deref().map(str::trim))
        .bind(email.is_some())
        .bind(email.flatten())
        .bind(update.bio.is_some())
        .bind(update.bio.clone().flatten())
        .bind(update.address.is_some())
        .bind(update.address.clone().flatten())
        .bind(update.profile_photo.is_some())
        .bind(update.profile_photo.clone().flatten())
        .bind(update.latitude.is_some())
        .bind(update.latitude.flatten())
        .bind(update.longitude.is_some())
        .bind(update.longitude.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::invalid(DUPLICATE_USER)
            } else {
                e.into()
            }
        })?;
        row.ok_or_else(|| CoreError::not_found("User not found"))
    }

    pub async fn update_location(&self, id: &str, latitude: f64, longitude: f64) -> CoreResult<()> {
        sqlx::query("UPDATE users SET latitude = $2, longitude = $3 WHERE id = $1")
            .bind(id)
            .bind(latitude)
            .bind(longitude)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Average rating (unrounded) and review count received by `id`.
    pub async fn rating_summary(&self, id: &str) -> CoreResult<(f64, i64)> {
        let (avg, count): (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(rating)::float8, COUNT(*) FROM reviews WHERE reviewee_id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok((avg.unwrap_or_default(), count))
    }

    pub async fn jobs_completed(&self, id: &str) -> CoreResult<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE professional_id = $1 AND status = 'completed'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn pro_stats(&self, id: &str) -> CoreResult<ProStats> {
        let (avg, reviews_count) = self.rating_summary(id).await?;
        Ok(ProStats {
            rating: crate::matching::round1(avg),
            jobs_completed: self.jobs_completed(id).await?,
            reviews_count,
        })
    }

    /// Public profile with computed statistics.
    pub async fn profile(&self, id: &str) -> CoreResult<ProProfileRes> {
        let user = self.require(id).await?;
        let stats = self.pro_stats(id).await?;
        Ok(user.into_profile(stats))
    }

    pub async fn active_pros_in_category(&self, category_id: &str) -> CoreResult<Vec<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users
             WHERE role = 'pro' AND is_active AND service_category = $1
             ORDER BY created_at",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list(&self) -> CoreResult<Vec<UserRow>> {
        Ok(
            sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(category: Option<&str>) -> SignupReq {
        SignupReq {
            email: Some(" Asha@Example.com ".into()),
            phone: "9000000001".into(),
            password: "password123".into(),
            full_name: "Asha Verma".into(),
            role: None,
            service_category: category.map(str::to_owned),
            bio: None,
            address: None,
        }
    }

    #[test]
    fn professionals_need_a_category() {
        let err = NewUser::from_signup(&signup(None), UserRole::Pro).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(NewUser::from_signup(&signup(Some("plumbing")), UserRole::Pro).is_ok());
    }

    #[test]
    fn customers_drop_service_category_and_normalise_email() {
        let user = NewUser::from_signup(&signup(Some("plumbing")), UserRole::Customer).unwrap();
        assert!(user.service_category.is_none());
        assert_eq!(user.email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut req = signup(None);
        req.full_name = "   ".into();
        assert!(NewUser::from_signup(&req, UserRole::Customer).is_err());

        let mut req = signup(None);
        req.phone = "1234567890123456".into();
        assert!(NewUser::from_signup(&req, UserRole::Customer).is_err());

        let mut req = signup(None);
        req.password = String::new();
        assert!(NewUser::from_signup(&req, UserRole::Customer).is_err());
    }
}
