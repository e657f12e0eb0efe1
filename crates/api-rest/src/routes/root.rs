use api_shared::{HealthRes, HealthService, RootRes};
use axum::extract::State;
use axum::Json;

use crate::state::AppState;

pub(crate) async fn welcome(State(state): State<AppState>) -> Json<RootRes> {
    Json(HealthService::welcome(&state.settings.project_name))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthRes))
)]
/// Liveness check, served both at the root and under the API prefix.
///
/// # Returns
/// * `Json<HealthRes>` - Always `{"status": "ok"}`
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}
