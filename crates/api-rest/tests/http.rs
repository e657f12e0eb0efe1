//! Router-level tests that never reach the database.
//!
//! The pool is created lazily, so every request exercised here must be answered before a
//! connection is needed: static routes, pure validation, authentication failures, malformed
//! webhooks and file uploads.

use std::sync::Arc;

use api_rest::{build_router, AppState};
use api_shared::{TokenKind, TokenService};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sns_core::payments::MockGateway;
use sns_core::{db, Settings};
use sns_files::{provision_dir, UploadStore};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "sns-test-boundary";

struct TestApp {
    router: Router,
    tokens: Arc<TokenService>,
    _temp: TempDir,
}

fn test_app() -> TestApp {
    let temp = TempDir::new().unwrap();
    let upload_root = temp.path().join("uploads").to_string_lossy().into_owned();
    let settings =
        Settings::from_lookup(move |key| (key == "UPLOAD_DIR").then(|| upload_root.clone()))
            .unwrap();

    let docs = provision_dir(&settings.upload_docs_dir()).unwrap();
    let uploads = UploadStore::new(&docs, "/uploads/docs").unwrap();
    let pool = db::connect_lazy(&settings).unwrap();
    let state = AppState::with_gateway(settings, pool, uploads, Arc::new(MockGateway)).unwrap();

    TestApp {
        tokens: state.tokens.clone(),
        router: build_router(state),
        _temp: temp,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, header::HeaderMap, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

async fn send_json(app: &TestApp, request: Request<Body>) -> (StatusCode, header::HeaderMap, Value) {
    let (status, headers, body) = send(app, request).await;
    (status, headers, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn root_welcomes_with_version() {
    let app = test_app();

    let (status, _, body) = send_json(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Welcome to SkillnScale Backend", "version": "0.2.0"})
    );
}

#[tokio::test]
async fn health_is_served_at_root_and_under_prefix() {
    let app = test_app();

    for uri in ["/health", "/api/v1/health"] {
        let (status, _, body) = send_json(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, json!({"status": "ok"}));
    }
}

#[tokio::test]
async fn openapi_document_lists_api_paths() {
    let app = test_app();

    let (status, _, body) = send_json(&app, get("/api/v1/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["servers"][0]["url"], "/api/v1");
    assert!(body["paths"]["/auth/login/json"].is_object());
    assert!(body["paths"]["/requests/{id}/matches"].is_object());
}

#[tokio::test]
async fn description_validation_accepts_relevant_text() {
    let app = test_app();

    let (status, _, body) = send_json(
        &app,
        post_json(
            "/api/v1/requests/validate-description",
            json!({"category_id": "plumbing", "description": "Kitchen sink pipe is leaking badly"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["message"], "Got it! We'll find you the right professional.");
}

#[tokio::test]
async fn description_validation_rejects_short_text_with_suggestion() {
    let app = test_app();

    let (status, _, body) = send_json(
        &app,
        post_json(
            "/api/v1/requests/validate-description",
            json!({"category_id": "plumbing", "description": "help"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["message"], "Please provide more details about your issue.");
    assert!(body["suggestion"].is_string());
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let app = test_app();

    let (status, headers, body) = send_json(&app, get("/api/v1/users/me")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body, json!({"detail": "Could not validate credentials"}));
}

#[tokio::test]
async fn protected_route_with_garbage_token_is_unauthorized() {
    let app = test_app();
    let request = Request::get("/api/v1/bookings/")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let app = test_app();
    let refresh = app.tokens.issue("some-user", TokenKind::Refresh).unwrap();
    let request = Request::get("/api/v1/customer/dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_token_is_not_a_refresh_token() {
    let app = test_app();
    let access = app.tokens.issue("some-user", TokenKind::Access).unwrap();

    let (status, _, body) = send_json(
        &app,
        post_json("/api/v1/auth/refresh", json!({"refresh_token": access})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn malformed_webhook_is_rejected() {
    let app = test_app();
    let request = Request::post("/api/v1/payments/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn unrelated_webhook_event_is_acknowledged() {
    let app = test_app();

    let (status, _, body) = send_json(
        &app,
        post_json("/api/v1/payments/webhook", json!({"type": "customer.created"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));
}

#[tokio::test]
async fn uploaded_file_is_stored_and_served() {
    let app = test_app();
    let content = b"estimate: repaint two bedrooms";

    let (status, _, body) =
        send_json(&app, multipart("/api/v1/uploads/", "file", "estimate.txt", content)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "estimate.txt");
    let url = body["url"].as_str().unwrap().to_owned();
    assert!(url.starts_with("/uploads/docs/sha256/"), "{url}");
    assert!(url.ends_with(".txt"), "{url}");

    let (status, _, served) = send(&app, get(&url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, content);
}

#[tokio::test]
async fn repeated_upload_returns_same_url_without_trailing_slash() {
    let app = test_app();

    let (_, _, first) = send_json(&app, multipart("/api/v1/uploads/", "file", "a.txt", b"dup")).await;
    let (status, _, second) =
        send_json(&app, multipart("/api/v1/uploads", "file", "b.txt", b"dup")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["url"], second["url"]);
    assert_eq!(second["filename"], "b.txt");
}

#[tokio::test]
async fn empty_upload_is_a_bad_request() {
    let app = test_app();

    let (status, _, body) =
        send_json(&app, multipart("/api/v1/uploads/", "file", "empty.pdf", b"")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Uploaded file is empty"}));
}

#[tokio::test]
async fn upload_without_file_field_is_a_bad_request() {
    let app = test_app();

    let (status, _, body) =
        send_json(&app, multipart("/api/v1/uploads/", "photo", "x.txt", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Missing form field: file");
}
