use std::sync::Arc;

use api_shared::TokenService;
use sns_core::notifications::{LogPushSender, NotificationService};
use sns_core::otp::OtpService;
use sns_core::payments::{gateway_for, PaymentGateway};
use sns_core::repositories::{
    availability::AvailabilityService, bookings::BookingService, categories::CategoryService,
    chat::ChatService, dashboards::DashboardService, payments::PaymentService,
    requests::RequestService, reviews::ReviewService, users::UserService,
};
use sns_core::{security, CoreResult, Settings};
use sns_files::UploadStore;
use sqlx::PgPool;

/// Shared state handed to every handler.
///
/// Services are cheap to clone; each holds a handle to the same connection pool.
#[derive(Clone, Debug)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub tokens: Arc<TokenService>,
    pub uploads: UploadStore,
    pub users: UserService,
    pub otp: OtpService,
    pub categories: CategoryService,
    pub requests: RequestService,
    pub availability: AvailabilityService,
    pub chat: ChatService,
    pub bookings: BookingService,
    pub reviews: ReviewService,
    pub dashboards: DashboardService,
    pub notifications: NotificationService,
    pub payments: PaymentService,
}

impl AppState {
    /// Wires services with the payment gateway selected by `settings`.
    pub fn new(settings: Settings, pool: PgPool, uploads: UploadStore) -> CoreResult<Self> {
        let gateway = gateway_for(&settings);
        Self::with_gateway(settings, pool, uploads, gateway)
    }

    pub fn with_gateway(
        settings: Settings,
        pool: PgPool,
        uploads: UploadStore,
        gateway: Arc<dyn PaymentGateway>,
    ) -> CoreResult<Self> {
        let tokens = security::token_service(&settings)?;
        let notifications = NotificationService::new(pool.clone(), Arc::new(LogPushSender));

        Ok(Self {
            settings: Arc::new(settings),
            tokens: Arc::new(tokens),
            uploads,
            users: UserService::new(pool.clone()),
            otp: OtpService::new(pool.clone()),
            categories: CategoryService::new(pool.clone()),
            requests: RequestService::new(pool.clone()),
            availability: AvailabilityService::new(pool.clone()),
            chat: ChatService::new(pool.clone(), notifications.clone()),
            bookings: BookingService::new(pool.clone(), notifications.clone()),
            reviews: ReviewService::new(pool.clone()),
            dashboards: DashboardService::new(pool.clone()),
            payments: PaymentService::new(pool, gateway),
            notifications,
        })
    }
}
