//! Payment records for bookings.

use std::collections::BTreeMap;
use std::sync::Arc;

use api_shared::PaymentIntentRes;
use sns_types::PaymentStatus;
use sqlx::PgPool;

use crate::constants::PAYMENT_CURRENCY;
use crate::models::{new_id, BookingRow, PaymentRow};
use crate::payments::{to_minor_units, IntentRequest, PaymentGateway, WebhookEvent};
use crate::repositories::bookings::BOOKING_NOT_FOUND;
use crate::{CoreError, CoreResult};

const ALREADY_PAID: &str = "Booking already paid";

#[derive(Clone, Debug)]
pub struct PaymentService {
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { pool, gateway }
    }

    /// Start paying for a booking on behalf of its customer.
    ///
    /// A booking holds a single payment record; retrying replaces the pending intent.
    ///
    /// The booking row stays locked until the payment row is written, so intents for one
    /// booking are created one at a time. A completed payment is never reopened.
    pub async fn create_intent(
        &self,
        customer_id: &str,
        booking_id: &str,
    ) -> CoreResult<PaymentIntentRes> {
        let mut tx = self.pool.begin().await?;
        let booking =
            sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::not_found(BOOKING_NOT_FOUND))?;
        if !booking.is_customer(customer_id) {
            return Err(CoreError::forbidden("Not authorized to pay for this booking"));
        }

        let paid: Option<String> = sqlx::query_scalar(
            "SELECT id FROM payments WHERE booking_id = $1 AND status = $2",
        )
        .bind(booking_id)
        .bind(PaymentStatus::Completed.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        if paid.is_some() {
            return Err(CoreError::invalid(ALREADY_PAID));
        }

        let amount = to_minor_units(booking.agreed_price);
        if amount <= 0 {
            return Err(CoreError::invalid("Invalid booking amount"));
        }

        let metadata = BTreeMap::from([
            ("booking_id".to_owned(), booking_id.to_owned()),
            ("customer_id".to_owned(), customer_id.to_owned()),
        ]);
        let intent = self
            .gateway
            .create_intent(&IntentRequest {
                amount,
                currency: PAYMENT_CURRENCY.to_owned(),
                metadata,
            })
            .await?;

        let payment = sqlx::query_as::<_, PaymentRow>(
            "INSERT INTO payments (id, booking_id, amount, currency, status, stripe_payment_intent_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (booking_id) DO UPDATE
                SET amount = EXCLUDED.amount,
                    status = EXCLUDED.status,
                    stripe_payment_intent_id = EXCLUDED.stripe_payment_intent_id,
                    updated_at = NOW()
                WHERE payments.status <> $7
             RETURNING *",
        )
        .bind(new_id())
        .bind(booking_id)
        .bind(booking.agreed_price)
        .bind(PAYMENT_CURRENCY)
        .bind(PaymentStatus::Pending.as_str())
        .bind(&intent.id)
        .bind(PaymentStatus::Completed.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::invalid(ALREADY_PAID))?;
        tx.commit().await?;

        tracing::info!(payment_id = %payment.id, booking_id, amount, "payment intent created");
        Ok(PaymentIntentRes {
            client_secret: intent.client_secret,
            payment_id: payment.id,
        })
    }

    pub async fn for_booking(&self, booking_id: &str) -> CoreResult<Option<PaymentRow>> {
        Ok(
            sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE booking_id = $1")
                .bind(booking_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Record the outcome reported by a webhook. Unknown intents are ignored.
    pub async fn apply_webhook(&self, event: &WebhookEvent) -> CoreResult<()> {
        let (intent_id, status) = match event {
            WebhookEvent::Succeeded { intent_id } => (intent_id, PaymentStatus::Completed),
            WebhookEvent::Failed { intent_id } => (intent_id, PaymentStatus::Failed),
            WebhookEvent::Ignored { kind } => {
                tracing::debug!(%kind, "ignoring webhook event");
                return Ok(());
            }
        };

        let updated = sqlx::query(
            "UPDATE payments SET status = $2, updated_at = NOW()
             WHERE stripe_payment_intent_id = $1 AND status <> $3",
        )
        .bind(intent_id)
        .bind(status.as_str())
        .bind(PaymentStatus::Completed.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            tracing::warn!(%intent_id, "webhook for unknown or already completed payment intent");
        } else {
            tracing::info!(%intent_id, %status, "payment status updated");
        }
        Ok(())
    }
}
