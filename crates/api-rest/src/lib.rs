//! # API REST
//!
//! REST API implementation for SkillnScale.
//!
//! Handles:
//! - HTTP endpoints with axum, mounted under `API_V1_STR`
//! - Bearer-token extractors and role guards
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON error bodies, CORS, static uploads)
//!
//! Business rules live in `sns-core`; wire types come from `api-shared`.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::server::Server;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, ApiResult};
pub use routes::ApiDoc;
pub use state::AppState;

/// Public path uploaded files are served under.
pub const UPLOADS_MOUNT: &str = "/uploads";

/// OpenAPI document with the configured prefix as its server URL.
pub fn openapi(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(api_prefix)]);
    doc
}

/// Builds the full application: API routes, docs, static uploads and middleware.
pub fn build_router(state: AppState) -> Router {
    let prefix = state.settings.api_v1_str.clone();
    let upload_root = state.settings.upload_dir().to_path_buf();

    Router::new()
        .route("/", get(routes::root::welcome))
        .route("/health", get(routes::root::health))
        .nest(&prefix, routes::api_router())
        .merge(SwaggerUi::new("/docs").url(format!("{prefix}/openapi.json"), openapi(&prefix)))
        .nest_service(UPLOADS_MOUNT, ServeDir::new(upload_root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
