use api_shared::{
    BookingRes, ErrorRes, LocationUpdateReq, LocationUpdateRes, ProDashboardRes, ProProfileRes,
    ServiceRequestRes,
};
use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::error::ApiResult;
use crate::extract::CurrentPro;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/professional/dashboard", get(dashboard))
        .route("/professional/requests", get(requests))
        .route("/professional/bookings", get(bookings))
        .route("/professional/location", put(update_location))
        .route("/professional/profile", get(profile))
}

#[utoipa::path(
    get,
    path = "/professional/dashboard",
    tag = "professional",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Professional statistics", body = ProDashboardRes),
        (status = 403, description = "Caller is not a professional", body = ErrorRes)
    )
)]
/// Home-screen counters for a professional.
///
/// # Returns
/// * `Ok(Json<ProDashboardRes>)` - Jobs, pending requests, earnings and rating
async fn dashboard(
    State(state): State<AppState>,
    CurrentPro(user): CurrentPro,
) -> ApiResult<Json<ProDashboardRes>> {
    Ok(Json(state.dashboards.professional(&user).await?))
}

#[utoipa::path(
    get,
    path = "/professional/requests",
    tag = "professional",
    security(("bearer" = [])),
    responses((status = 200, description = "Open requests, newest first", body = [ServiceRequestRes]))
)]
/// Open requests in the professional's own category; empty when no category is set.
async fn requests(
    State(state): State<AppState>,
    CurrentPro(user): CurrentPro,
) -> ApiResult<Json<Vec<ServiceRequestRes>>> {
    let Some(category) = user.service_category.as_deref() else {
        return Ok(Json(Vec::new()));
    };
    let rows = state.requests.list_open(Some(category)).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/professional/bookings",
    tag = "professional",
    security(("bearer" = [])),
    responses((status = 200, description = "Assigned bookings, newest first", body = [BookingRes]))
)]
/// Jobs assigned to the professional, newest first.
async fn bookings(
    State(state): State<AppState>,
    CurrentPro(user): CurrentPro,
) -> ApiResult<Json<Vec<BookingRes>>> {
    let rows = state.bookings.list_for_professional(&user.id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/professional/location",
    tag = "professional",
    security(("bearer" = [])),
    request_body = LocationUpdateReq,
    responses((status = 200, description = "Location stored", body = LocationUpdateRes))
)]
/// Stores the professional's current coordinates.
///
/// # Returns
/// * `Ok(Json<LocationUpdateRes>)` - The coordinates as stored
async fn update_location(
    State(state): State<AppState>,
    CurrentPro(user): CurrentPro,
    Json(req): Json<LocationUpdateReq>,
) -> ApiResult<Json<LocationUpdateRes>> {
    state
        .users
        .update_location(&user.id, req.latitude, req.longitude)
        .await?;
    Ok(Json(LocationUpdateRes {
        status: "updated".into(),
        lat: req.latitude,
        lng: req.longitude,
    }))
}

#[utoipa::path(
    get,
    path = "/professional/profile",
    tag = "professional",
    security(("bearer" = [])),
    responses((status = 200, description = "Own profile with statistics", body = ProProfileRes))
)]
/// The professional's own profile with computed statistics.
async fn profile(
    State(state): State<AppState>,
    CurrentPro(user): CurrentPro,
) -> ApiResult<Json<ProProfileRes>> {
    let stats = state.users.pro_stats(&user.id).await?;
    Ok(Json(user.into_profile(stats)))
}
