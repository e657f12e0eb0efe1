use api_shared::{
    DescriptionValidationReq, DescriptionValidationRes, ErrorRes, OpenRequestsQuery,
    ProProfileRes, ServiceRequestCreateReq, ServiceRequestRes, ServiceRequestUpdateReq,
};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use sns_core::validation::validate_description;

use super::RouterExt;
use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .collection("/requests", get(list_own).post(create))
        .route("/requests/validate-description", post(check_description))
        .route("/requests/open", get(list_open))
        .route("/requests/:id", get(read).patch(update))
        .route("/requests/:id/matches", get(matches))
}

#[utoipa::path(
    post,
    path = "/requests/validate-description",
    tag = "requests",
    request_body = DescriptionValidationReq,
    responses((status = 200, description = "Validation outcome", body = DescriptionValidationRes))
)]
/// Keyword check run by the client before a request is posted.
///
/// # Returns
/// * `Json<DescriptionValidationRes>` - Verdict, message and, when invalid, an example
async fn check_description(
    Json(req): Json<DescriptionValidationReq>,
) -> Json<DescriptionValidationRes> {
    Json(validate_description(&req.category_id, &req.description))
}

#[utoipa::path(
    post,
    path = "/requests/",
    tag = "requests",
    security(("bearer" = [])),
    request_body = ServiceRequestCreateReq,
    responses(
        (status = 200, description = "Request posted", body = ServiceRequestRes),
        (status = 400, description = "Invalid request or unknown category", body = ErrorRes)
    )
)]
/// Posts a new service request for the caller.
///
/// # Returns
/// * `Ok(Json<ServiceRequestRes>)` - The request, status `open`
///
/// # Errors
/// Returns `400 Bad Request` for an unknown category or blank fields.
async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ServiceRequestCreateReq>,
) -> ApiResult<Json<ServiceRequestRes>> {
    let row = state.requests.create(&user.id, &req).await?;
    tracing::info!(request_id = %row.id, category = %row.category_id, "service request posted");
    Ok(Json(row.into()))
}

#[utoipa::path(
    get,
    path = "/requests/",
    tag = "requests",
    security(("bearer" = [])),
    responses((status = 200, description = "Caller's requests, newest first", body = [ServiceRequestRes]))
)]
/// Requests the caller has posted, newest first.
async fn list_own(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ServiceRequestRes>>> {
    let rows = state.requests.list_for_customer(&user.id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/requests/open",
    tag = "requests",
    security(("bearer" = [])),
    params(OpenRequestsQuery),
    responses((status = 200, description = "Open requests, newest first", body = [ServiceRequestRes]))
)]
/// Open requests, optionally filtered by category, newest first.
async fn list_open(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<OpenRequestsQuery>,
) -> ApiResult<Json<Vec<ServiceRequestRes>>> {
    let rows = state.requests.list_open(query.category.as_deref()).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "The request", body = ServiceRequestRes),
        (status = 404, description = "Request not found", body = ErrorRes)
    )
)]
/// One service request. No authentication required.
///
/// # Errors
/// Returns `404 Not Found` if the request does not exist.
async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ServiceRequestRes>> {
    Ok(Json(state.requests.require(&id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/requests/{id}/matches",
    tag = "requests",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Scored professionals", body = [ProProfileRes]),
        (status = 404, description = "Request not found", body = ErrorRes)
    )
)]
/// Active professionals in the request's category, best match first.
///
/// # Returns
/// * `Ok(Json<Vec<ProProfileRes>>)` - Profiles with `match_score` and `match_reason` set
async fn matches(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ProProfileRes>>> {
    Ok(Json(state.requests.matches(&id).await?))
}

#[utoipa::path(
    patch,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Request id")),
    request_body = ServiceRequestUpdateReq,
    responses(
        (status = 200, description = "Updated request", body = ServiceRequestRes),
        (status = 403, description = "Not the owner", body = ErrorRes),
        (status = 404, description = "Request not found", body = ErrorRes)
    )
)]
/// Partial update by the request's owner. `null` clears coordinates or the schedule.
///
/// # Returns
/// * `Ok(Json<ServiceRequestRes>)` - The updated request
///
/// # Errors
/// - `403 Forbidden` if the caller did not post the request
/// - `404 Not Found` if the request does not exist
async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ServiceRequestUpdateReq>,
) -> ApiResult<Json<ServiceRequestRes>> {
    Ok(Json(state.requests.update(&id, &user.id, &req).await?.into()))
}
