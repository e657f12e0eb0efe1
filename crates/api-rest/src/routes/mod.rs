//! HTTP handlers, one module per resource.
//!
//! Paths are relative to the API prefix (`API_V1_STR`). Collection endpoints answer with and
//! without a trailing slash, as existing clients call both forms.

use axum::routing::MethodRouter;
use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod chat;
pub mod customer;
pub mod notifications;
pub mod payments;
pub mod professional;
pub mod requests;
pub mod reviews;
pub mod root;
pub mod services;
pub mod uploads;
pub mod users;

pub(crate) trait RouterExt {
    /// Registers `path` and `path/` with the same handlers.
    fn collection(self, path: &str, methods: MethodRouter<AppState>) -> Self;
}

impl RouterExt for Router<AppState> {
    fn collection(self, path: &str, methods: MethodRouter<AppState>) -> Self {
        self.route(path, methods.clone())
            .route(&format!("{path}/"), methods)
    }
}

/// All API routes, without the prefix.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", axum::routing::get(root::health))
        .merge(auth::router())
        .merge(users::router())
        .merge(services::router())
        .merge(requests::router())
        .merge(availability::router())
        .merge(chat::router())
        .merge(bookings::router())
        .merge(reviews::router())
        .merge(customer::router())
        .merge(professional::router())
        .merge(notifications::router())
        .merge(payments::router())
        .merge(uploads::router())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "SkillnScale Backend"),
    modifiers(&BearerAuth),
    paths(
        root::health,
        auth::signup,
        auth::signup_customer,
        auth::signup_pro,
        auth::login,
        auth::login_json,
        auth::refresh,
        auth::send_otp,
        auth::verify_otp,
        users::read_me,
        users::update_me,
        users::read_user,
        services::list_categories,
        services::popular_categories,
        requests::check_description,
        requests::create,
        requests::list_own,
        requests::list_open,
        requests::read,
        requests::matches,
        requests::update,
        availability::create,
        availability::list_own,
        availability::list_for_pro,
        availability::update,
        availability::remove,
        chat::open_room,
        chat::list_rooms,
        chat::list_messages,
        chat::send_message,
        chat::accept_price,
        bookings::list,
        bookings::read,
        bookings::update_status,
        reviews::create,
        reviews::received_by,
        customer::dashboard,
        customer::requests,
        customer::bookings,
        customer::profile,
        professional::dashboard,
        professional::requests,
        professional::bookings,
        professional::update_location,
        professional::profile,
        notifications::register_device,
        payments::create_intent,
        payments::webhook,
        uploads::upload,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::AckRes,
        api_shared::StatusRes,
        api_shared::UploadRes,
        api_shared::TokenRes,
        api_shared::SignupReq,
        api_shared::LoginReq,
        api_shared::LoginForm,
        api_shared::RefreshReq,
        api_shared::OtpSendReq,
        api_shared::OtpVerifyReq,
        api_shared::UserRes,
        api_shared::UserUpdateReq,
        api_shared::ProProfileRes,
        api_shared::CategoryRes,
        api_shared::ServiceRequestCreateReq,
        api_shared::ServiceRequestUpdateReq,
        api_shared::ServiceRequestRes,
        api_shared::DescriptionValidationReq,
        api_shared::DescriptionValidationRes,
        api_shared::AvailabilityCreateReq,
        api_shared::AvailabilityUpdateReq,
        api_shared::AvailabilityRes,
        api_shared::ChatRoomCreateReq,
        api_shared::ChatRoomRes,
        api_shared::MessageCreateReq,
        api_shared::MessageRes,
        api_shared::BookingRes,
        api_shared::BookingStatusUpdateReq,
        api_shared::ReviewCreateReq,
        api_shared::ReviewRes,
        api_shared::CustomerDashboardRes,
        api_shared::ProDashboardRes,
        api_shared::LocationUpdateReq,
        api_shared::LocationUpdateRes,
        api_shared::DeviceTokenCreateReq,
        api_shared::DeviceTokenRes,
        api_shared::PaymentIntentRes,
        uploads::UploadForm,
        sns_types::UserRole,
        sns_types::Urgency,
        sns_types::RequestStatus,
        sns_types::RecurrencePattern,
        sns_types::MessageType,
        sns_types::BookingStatus,
        sns_types::DevicePlatform,
        sns_types::DeliveryMethod,
    ))
)]
pub struct ApiDoc;
