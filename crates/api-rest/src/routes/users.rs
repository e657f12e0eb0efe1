use api_shared::{ErrorRes, ProProfileRes, UserRes, UserUpdateReq};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(read_me).patch(update_me))
        .route("/users/:id", get(read_user))
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's account", body = UserRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// The caller's own account.
async fn read_me(CurrentUser(user): CurrentUser) -> Json<UserRes> {
    Json(user.into())
}

#[utoipa::path(
    patch,
    path = "/users/me",
    tag = "users",
    security(("bearer" = [])),
    request_body = UserUpdateReq,
    responses((status = 200, description = "Updated account", body = UserRes))
)]
/// Partial update of the caller's profile. `null` clears an optional field.
///
/// # Returns
/// * `Ok(Json<UserRes>)` - The updated account
///
/// # Errors
/// Returns `400 Bad Request` if the new email belongs to another account.
async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UserUpdateReq>,
) -> ApiResult<Json<UserRes>> {
    let updated = state.users.update_profile(&user.id, &req).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile", body = ProProfileRes),
        (status = 404, description = "User not found", body = ErrorRes)
    )
)]
/// Public profile with rating, completed jobs and review count.
///
/// # Errors
/// Returns `404 Not Found` if the user does not exist.
async fn read_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProProfileRes>> {
    Ok(Json(state.users.profile(&id).await?))
}
