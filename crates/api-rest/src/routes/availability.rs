use api_shared::{AckRes, AvailabilityCreateReq, AvailabilityRes, AvailabilityUpdateReq, ErrorRes};
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use super::RouterExt;
use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::state::AppState;

pub const PROS_ONLY: &str = "Only professionals can set availability";

pub fn router() -> Router<AppState> {
    Router::new()
        .collection("/availability", post(create))
        .route("/availability/me", get(list_own))
        .route("/availability/:id", get(list_for_pro).put(update).delete(remove))
}

#[utoipa::path(
    post,
    path = "/availability/",
    tag = "availability",
    security(("bearer" = [])),
    request_body = AvailabilityCreateReq,
    responses(
        (status = 200, description = "Slot created", body = AvailabilityRes),
        (status = 400, description = "Not a professional or malformed slot", body = ErrorRes)
    )
)]
/// Adds a time slot to the caller's calendar.
///
/// # Returns
/// * `Ok(Json<AvailabilityRes>)` - The stored slot
///
/// # Errors
/// Returns `400 Bad Request` if the caller is not a professional, the date, times or
/// recurrence pattern are invalid, or the slot overlaps another one on the same date.
async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<AvailabilityCreateReq>,
) -> ApiResult<Json<AvailabilityRes>> {
    if !user.is_pro() {
        return Err(ApiError::bad_request(PROS_ONLY));
    }
    Ok(Json(state.availability.create(&user.id, &req).await?.into()))
}

#[utoipa::path(
    get,
    path = "/availability/me",
    tag = "availability",
    security(("bearer" = [])),
    responses((status = 200, description = "Caller's slots by date and start", body = [AvailabilityRes]))
)]
/// The caller's slots, ordered by date then start time.
///
/// # Returns
/// * `Ok(Json<Vec<AvailabilityRes>>)` - Booked and unbooked slots
async fn list_own(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<AvailabilityRes>>> {
    let rows = state.availability.list_own(&user.id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/availability/{pro_id}",
    tag = "availability",
    params(("pro_id" = String, Path, description = "Professional id")),
    responses((status = 200, description = "Open slots", body = [AvailabilityRes]))
)]
/// Unbooked slots of one professional. No authentication required.
///
/// # Returns
/// * `Ok(Json<Vec<AvailabilityRes>>)` - Open slots, soonest first
async fn list_for_pro(
    State(state): State<AppState>,
    Path(pro_id): Path<String>,
) -> ApiResult<Json<Vec<AvailabilityRes>>> {
    let rows = state.availability.list_open(&pro_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/availability/{slot_id}",
    tag = "availability",
    security(("bearer" = [])),
    params(("slot_id" = String, Path, description = "Slot id")),
    request_body = AvailabilityUpdateReq,
    responses(
        (status = 200, description = "Updated slot", body = AvailabilityRes),
        (status = 403, description = "Not the owner", body = ErrorRes),
        (status = 404, description = "Slot not found", body = ErrorRes)
    )
)]
/// Changes the times or recurrence of one of the caller's slots.
///
/// # Returns
/// * `Ok(Json<AvailabilityRes>)` - The updated slot
///
/// # Errors
/// - `400 Bad Request` if the new window is invalid or overlaps another slot
/// - `403 Forbidden` if the slot belongs to someone else
/// - `404 Not Found` if the slot does not exist
async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slot_id): Path<String>,
    Json(req): Json<AvailabilityUpdateReq>,
) -> ApiResult<Json<AvailabilityRes>> {
    let row = state.availability.update(&slot_id, &user.id, &req).await?;
    Ok(Json(row.into()))
}

#[utoipa::path(
    delete,
    path = "/availability/{slot_id}",
    tag = "availability",
    security(("bearer" = [])),
    params(("slot_id" = String, Path, description = "Slot id")),
    responses(
        (status = 200, description = "Slot deleted", body = AckRes),
        (status = 403, description = "Not the owner", body = ErrorRes),
        (status = 404, description = "Slot not found", body = ErrorRes)
    )
)]
/// Deletes one of the caller's slots.
///
/// # Returns
/// * `Ok(Json<AckRes>)` - `{"message": "Slot deleted"}`
async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slot_id): Path<String>,
) -> ApiResult<Json<AckRes>> {
    state.availability.delete(&slot_id, &user.id).await?;
    Ok(Json(AckRes {
        message: "Slot deleted".into(),
    }))
}
