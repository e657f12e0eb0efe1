use api_shared::{DeviceTokenCreateReq, DeviceTokenRes};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/notifications/device-token", post(register_device))
}

#[utoipa::path(
    post,
    path = "/notifications/device-token",
    tag = "notifications",
    security(("bearer" = [])),
    request_body = DeviceTokenCreateReq,
    responses((status = 200, description = "Registered token", body = DeviceTokenRes))
)]
/// Registers a push token for the caller; a token already known is moved to the caller.
///
/// # Returns
/// * `Ok(Json<DeviceTokenRes>)` - The stored registration
async fn register_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<DeviceTokenCreateReq>,
) -> ApiResult<Json<DeviceTokenRes>> {
    let row = state.notifications.register_device(&user.id, &req).await?;
    Ok(Json(row.into()))
}
