use api_shared::{ErrorRes, ReviewCreateReq, ReviewRes};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::RouterExt;
use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .collection("/reviews", post(create))
        .route("/reviews/:user_id", get(received_by))
}

#[utoipa::path(
    post,
    path = "/reviews/",
    tag = "reviews",
    security(("bearer" = [])),
    request_body = ReviewCreateReq,
    responses(
        (status = 200, description = "Review stored", body = ReviewRes),
        (status = 400, description = "Booking not completed, duplicate, or bad rating", body = ErrorRes),
        (status = 403, description = "Not a party to the booking", body = ErrorRes),
        (status = 404, description = "Booking not found", body = ErrorRes)
    )
)]
/// Reviews the other party of a completed booking.
///
/// # Returns
/// * `Ok(Json<ReviewRes>)` - The stored review
///
/// # Errors
/// - `400 Bad Request` if the booking is not completed, was already reviewed by the caller, or
///   the rating is outside 1 to 5
/// - `403 Forbidden` if the caller did not take part in the booking
/// - `404 Not Found` if the booking does not exist
async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ReviewCreateReq>,
) -> ApiResult<Json<ReviewRes>> {
    Ok(Json(state.reviews.create(&user, &req).await?.into()))
}

#[utoipa::path(
    get,
    path = "/reviews/{user_id}",
    tag = "reviews",
    params(("user_id" = String, Path, description = "Reviewed user")),
    responses((status = 200, description = "Reviews received, newest first", body = [ReviewRes]))
)]
/// Reviews a user has received, newest first. No authentication required.
async fn received_by(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<ReviewRes>>> {
    let rows = state.reviews.received_by(&user_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
