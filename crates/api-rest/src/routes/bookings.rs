use api_shared::{BookingRes, BookingStatusUpdateReq, ErrorRes};
use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};

use super::RouterExt;
use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .collection("/bookings", get(list))
        .route("/bookings/:id", get(read))
        .route("/bookings/:id/status", patch(update_status))
}

#[utoipa::path(
    get,
    path = "/bookings/",
    tag = "bookings",
    security(("bearer" = [])),
    responses((status = 200, description = "Caller's bookings, newest first", body = [BookingRes]))
)]
/// Bookings the caller takes part in, newest first.
///
/// Professionals see jobs assigned to them; everyone else sees what they booked.
///
/// # Returns
/// * `Ok(Json<Vec<BookingRes>>)` - The caller's bookings
async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<BookingRes>>> {
    let rows = state.bookings.list_for(&user).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "The booking", body = BookingRes),
        (status = 403, description = "Not a party", body = ErrorRes),
        (status = 404, description = "Booking not found", body = ErrorRes)
    )
)]
/// One booking, visible to its customer and professional only.
///
/// # Returns
/// * `Ok(Json<BookingRes>)` - The booking
///
/// # Errors
/// - `403 Forbidden` for anyone else
/// - `404 Not Found` if the booking does not exist
async fn read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<BookingRes>> {
    Ok(Json(state.bookings.require_party(&id, &user.id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/bookings/{id}/status",
    tag = "bookings",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Booking id")),
    request_body = BookingStatusUpdateReq,
    responses(
        (status = 200, description = "Updated booking", body = BookingRes),
        (status = 400, description = "Invalid status transition", body = ErrorRes),
        (status = 403, description = "Transition not allowed for the caller", body = ErrorRes)
    )
)]
/// Moves a booking along its lifecycle and notifies the other party.
///
/// # Returns
/// * `Ok(Json<BookingRes>)` - The booking with its new status
///
/// # Errors
/// - `400 Bad Request` if the transition is not allowed from the current status
/// - `403 Forbidden` if the caller may not perform this transition
async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<BookingStatusUpdateReq>,
) -> ApiResult<Json<BookingRes>> {
    let booking = state.bookings.update_status(&id, &user, req.status).await?;
    tracing::info!(booking_id = %booking.id, status = %booking.status, "booking status changed");
    Ok(Json(booking.into()))
}
