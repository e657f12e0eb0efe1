use api_shared::CategoryRes;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/services/categories", get(list_categories))
        .route("/services/popular", get(popular_categories))
}

#[utoipa::path(
    get,
    path = "/services/categories",
    tag = "services",
    responses((status = 200, description = "All categories by name", body = [CategoryRes]))
)]
/// All service categories, ordered by name.
async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryRes>>> {
    let rows = state.categories.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/services/popular",
    tag = "services",
    responses((status = 200, description = "Featured categories", body = [CategoryRes]))
)]
/// Categories featured on the home screen.
async fn popular_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryRes>>> {
    let rows = state.categories.popular().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
