use api_shared::{ErrorRes, PaymentIntentQuery, PaymentIntentRes, StatusRes};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use sns_core::payments::parse_webhook;

use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments/create-payment-intent", post(create_intent))
        .route("/payments/webhook", post(webhook))
}

#[utoipa::path(
    post,
    path = "/payments/create-payment-intent",
    tag = "payments",
    security(("bearer" = [])),
    params(PaymentIntentQuery),
    responses(
        (status = 200, description = "Client secret for the payment sheet", body = PaymentIntentRes),
        (status = 400, description = "Already paid, zero amount, or gateway failure", body = ErrorRes),
        (status = 403, description = "Caller is not the booking's customer", body = ErrorRes),
        (status = 404, description = "Booking not found", body = ErrorRes)
    )
)]
/// Starts a card payment for one of the caller's bookings.
///
/// # Returns
/// * `Ok(Json<PaymentIntentRes>)` - Client secret for the payment sheet and the payment id
///
/// # Errors
/// - `400 Bad Request` if the booking is already paid, has no amount, or the gateway refuses
/// - `403 Forbidden` if the caller is not the booking's customer
/// - `404 Not Found` if the booking does not exist
async fn create_intent(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PaymentIntentQuery>,
) -> ApiResult<Json<PaymentIntentRes>> {
    let intent = state.payments.create_intent(&user.id, &query.booking_id).await?;
    tracing::info!(
        booking_id = %query.booking_id,
        payment_id = %intent.payment_id,
        "payment intent created"
    );
    Ok(Json(intent))
}

#[utoipa::path(
    post,
    path = "/payments/webhook",
    tag = "payments",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Event processed", body = StatusRes),
        (status = 400, description = "Malformed event", body = ErrorRes)
    )
)]
/// Payment provider callback. The payload is trusted as sent.
///
/// # Returns
/// * `Ok(Json<StatusRes>)` - `{"status": "success"}`, also for events that are ignored
///
/// # Errors
/// Returns `400 Bad Request` if the body is not a JSON event.
async fn webhook(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<StatusRes>> {
    let event = parse_webhook(&body)?;
    state.payments.apply_webhook(&event).await?;
    Ok(Json(StatusRes {
        status: "success".into(),
    }))
}
