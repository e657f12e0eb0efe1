use api_shared::{BookingRes, CustomerDashboardRes, ErrorRes, ServiceRequestRes, UserRes};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiResult;
use crate::extract::CurrentCustomer;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customer/dashboard", get(dashboard))
        .route("/customer/requests", get(requests))
        .route("/customer/bookings", get(bookings))
        .route("/customer/profile", get(profile))
}

#[utoipa::path(
    get,
    path = "/customer/dashboard",
    tag = "customer",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Customer statistics", body = CustomerDashboardRes),
        (status = 403, description = "Caller is not a customer", body = ErrorRes)
    )
)]
/// Home-screen counters for a customer.
///
/// # Returns
/// * `Ok(Json<CustomerDashboardRes>)` - Active requests, bookings and total spent
async fn dashboard(
    State(state): State<AppState>,
    CurrentCustomer(user): CurrentCustomer,
) -> ApiResult<Json<CustomerDashboardRes>> {
    Ok(Json(state.dashboards.customer(&user.id).await?))
}

#[utoipa::path(
    get,
    path = "/customer/requests",
    tag = "customer",
    security(("bearer" = [])),
    responses((status = 200, description = "Own requests, newest first", body = [ServiceRequestRes]))
)]
/// Requests the customer has posted, newest first.
async fn requests(
    State(state): State<AppState>,
    CurrentCustomer(user): CurrentCustomer,
) -> ApiResult<Json<Vec<ServiceRequestRes>>> {
    let rows = state.requests.list_for_customer(&user.id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/customer/bookings",
    tag = "customer",
    security(("bearer" = [])),
    responses((status = 200, description = "Own bookings, newest first", body = [BookingRes]))
)]
/// Bookings the customer has made, newest first.
async fn bookings(
    State(state): State<AppState>,
    CurrentCustomer(user): CurrentCustomer,
) -> ApiResult<Json<Vec<BookingRes>>> {
    let rows = state.bookings.list_for_customer(&user.id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/customer/profile",
    tag = "customer",
    security(("bearer" = [])),
    responses((status = 200, description = "Own account", body = UserRes))
)]
/// The customer's own account.
async fn profile(CurrentCustomer(user): CurrentCustomer) -> Json<UserRes> {
    Json(user.into())
}
