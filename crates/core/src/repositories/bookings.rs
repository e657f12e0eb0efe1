//! Bookings and their status lifecycle.

use sns_types::{BookingStatus, RequestStatus};
use sqlx::PgPool;

use crate::lifecycle::{check_actor, check_transition, status_notice, Party};
use crate::models::{BookingRow, UserRow};
use crate::notifications::{Notification, NotificationService};
use crate::repositories::requests;
use crate::{CoreError, CoreResult};

pub const BOOKING_NOT_FOUND: &str = "Booking not found";

#[derive(Clone, Debug)]
pub struct BookingService {
    pool: PgPool,
    notifier: NotificationService,
}

impl BookingService {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self { pool, notifier }
    }

    /// Bookings of `user`: jobs for a professional, purchases for a customer.
    pub async fn list_for(&self, user: &UserRow) -> CoreResult<Vec<BookingRow>> {
        if user.is_pro() {
            self.list_for_professional(&user.id).await
        } else {
            self.list_for_customer(&user.id).await
        }
    }

    pub async fn list_for_customer(&self, customer_id: &str) -> CoreResult<Vec<BookingRow>> {
        Ok(sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_for_professional(&self, professional_id: &str) -> CoreResult<Vec<BookingRow>> {
        Ok(sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE professional_id = $1 ORDER BY created_at DESC",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn find(&self, id: &str) -> CoreResult<Option<BookingRow>> {
        Ok(sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn require(&self, id: &str) -> CoreResult<BookingRow> {
        self.find(id)
            .await?
            .ok_or_else(|| CoreError::not_found(BOOKING_NOT_FOUND))
    }

    /// A booking visible only to its two parties.
    pub async fn require_party(&self, id: &str, user_id: &str) -> CoreResult<BookingRow> {
        let booking = self.require(id).await?;
        if !booking.is_party(user_id) {
            return Err(CoreError::forbidden("Not authorized"));
        }
        Ok(booking)
    }

    /// Move a booking to `to` on behalf of `actor`, updating the underlying request.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the booking does not exist
    /// - [`CoreError::Forbidden`] if `actor` is not a party or may not perform this change
    /// - [`CoreError::InvalidInput`] if the transition is not allowed from the current status
    pub async fn update_status(
        &self,
        id: &str,
        actor: &UserRow,
        to: BookingStatus,
    ) -> CoreResult<BookingRow> {
        let mut tx = self.pool.begin().await?;
        let booking = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found(BOOKING_NOT_FOUND))?;

        let party = if booking.is_professional(&actor.id) {
            Party::Professional
        } else if booking.is_customer(&actor.id) {
            Party::Customer
        } else {
            return Err(CoreError::forbidden("Not authorized"));
        };

        let from = booking.status()?;
        check_transition(from, to)?;
        check_actor(to, party)?;

        let updated = sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings SET
                status = $2,
                completed_at = CASE WHEN $3 THEN NOW() ELSE completed_at END
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(to.as_str())
        .bind(to == BookingStatus::Completed)
        .fetch_one(&mut *tx)
        .await?;

        match to {
            BookingStatus::Completed => {
                requests::set_status(&mut *tx, &booking.request_id, RequestStatus::Completed)
                    .await?
            }
            BookingStatus::Cancelled => {
                requests::set_status(&mut *tx, &booking.request_id, RequestStatus::Cancelled)
                    .await?
            }
            BookingStatus::Confirmed | BookingStatus::InProgress => {}
        }
        tx.commit().await?;
        tracing::info!(booking_id = %id, %from, %to, "booking status changed");

        if let Some(other) = updated.counterpart(&actor.id) {
            self.notifier
                .send_to_user(
                    other,
                    Notification::new("Booking Update", status_notice(to))
                        .with("booking_id", updated.id.clone())
                        .with("type", "booking_status")
                        .with("status", to.as_str()),
                )
                .await;
        }
        Ok(updated)
    }
}
