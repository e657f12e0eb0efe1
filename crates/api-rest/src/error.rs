//! Mapping of service errors onto HTTP responses.
//!
//! Every error leaves the server as `{"detail": "..."}`. Infrastructure failures are logged
//! and replaced by a generic message.

use api_shared::{ErrorRes, TokenError};
use axum::extract::multipart::MultipartError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use sns_core::CoreError;
use sns_files::FilesError;

pub const CREDENTIALS_REJECTED: &str = "Could not validate credentials";
pub const NOT_ENOUGH_PRIVILEGES: &str = "The user does not have enough privileges";
const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// 401 with a bearer challenge.
    pub fn credentials() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, CREDENTIALS_REJECTED)
    }

    pub fn privileges() -> Self {
        Self::new(StatusCode::FORBIDDEN, NOT_ENOUGH_PRIVILEGES)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match &err {
            CoreError::InvalidInput(_) | CoreError::Conflict(_) | CoreError::Gateway(_) => {
                StatusCode::BAD_REQUEST
            }
            CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                tracing::error!(error = ?err, "request failed");
                return Self::internal();
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => {
                tracing::error!(error = ?e, "token signing failed");
                Self::internal()
            }
            other => {
                tracing::debug!(error = %other, "token rejected");
                Self::credentials()
            }
        }
    }
}

impl From<FilesError> for ApiError {
    fn from(err: FilesError) -> Self {
        match err {
            FilesError::EmptyUpload => Self::bad_request(err.to_string()),
            other => {
                tracing::error!(error = ?other, "upload storage failed");
                Self::internal()
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ErrorRes {
                detail: self.detail,
            }),
        )
            .into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = ApiError::from(CoreError::not_found("Booking not found"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.detail(), "Booking not found");

        let err = ApiError::from(CoreError::Gateway("card declined".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "Stripe error: card declined");
    }

    #[test]
    fn infrastructure_errors_are_hidden() {
        let err = ApiError::from(CoreError::Config("DATABASE_URL missing".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), INTERNAL_ERROR);
    }

    #[test]
    fn token_errors_become_credential_failures() {
        let err = ApiError::from(TokenError::Expired);
        assert_eq!(err, ApiError::credentials());
    }

    #[test]
    fn unauthorized_carries_bearer_challenge() {
        let response = ApiError::credentials().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = ApiError::privileges().into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
