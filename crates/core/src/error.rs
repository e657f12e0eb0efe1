use sns_types::{RatingError, TextError, UnknownVariant};

/// Errors produced by marketplace services.
///
/// The first group carries a client-facing message and maps onto a 4xx response. The
/// remaining variants are infrastructure failures whose detail is logged but never shown.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Stripe error: {0}")]
    Gateway(String),

    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid value stored in database: {0}")]
    InvalidStoredValue(#[from] UnknownVariant),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("failed to issue token: {0}")]
    Token(#[from] api_shared::TokenError),
    #[error("failed to serialize: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to hash password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error("background task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl CoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// True for variants whose message is safe to return to the caller.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::Unauthorized(_)
                | Self::Forbidden(_)
                | Self::NotFound(_)
                | Self::Conflict(_)
                | Self::Gateway(_)
        )
    }
}

impl From<TextError> for CoreError {
    fn from(err: TextError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<RatingError> for CoreError {
    fn from(err: RatingError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_display_their_message_verbatim() {
        let err = CoreError::not_found("Request not found");
        assert_eq!(err.to_string(), "Request not found");
        assert!(err.is_client_error());
    }

    #[test]
    fn gateway_errors_are_prefixed() {
        let err = CoreError::Gateway("card declined".into());
        assert_eq!(err.to_string(), "Stripe error: card declined");
    }

    #[test]
    fn infrastructure_errors_are_not_client_errors() {
        let err = CoreError::Io(std::io::Error::other("disk"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn rating_errors_become_invalid_input() {
        let err: CoreError = sns_types::Rating::new(9).unwrap_err().into();
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg == "Rating must be between 1 and 5"));
    }
}
