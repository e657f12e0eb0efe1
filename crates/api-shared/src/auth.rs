//! Bearer token issuing and validation.
//!
//! Access tokens are short lived and authorise API calls. Refresh tokens are
//! long lived and can only be exchanged for a new pair. Both are HMAC-signed
//! JWTs whose `sub` claim is the user id; the `typ` claim keeps the two kinds
//! from being used interchangeably.

use crate::dto::TokenRes;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of a token pair a JWT represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every token we issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub typ: TokenKind,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("token has expired")]
    Expired,
    #[error("expected {expected:?} token, got {found:?}")]
    WrongKind { expected: TokenKind, found: TokenKind },
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Issues and validates token pairs with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnsupportedAlgorithm`] unless `algorithm` names one of the
    /// HMAC algorithms (`HS256`, `HS384`, `HS512`).
    pub fn new(
        secret: &str,
        algorithm: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, TokenError> {
        let algorithm = match algorithm {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => return Err(TokenError::UnsupportedAlgorithm(other.to_owned())),
        };

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            access_ttl,
            refresh_ttl,
        })
    }

    /// Signs a token of the given kind for `subject`.
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_owned(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            typ: kind,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Issues a fresh access/refresh pair.
    pub fn issue_pair(&self, subject: &str) -> Result<TokenRes, TokenError> {
        Ok(TokenRes {
            access_token: self.issue(subject, TokenKind::Access)?,
            refresh_token: self.issue(subject, TokenKind::Refresh)?,
            token_type: "bearer".into(),
        })
    }

    /// Verifies the signature and expiry of `token` and checks it is of the `expected` kind.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let claims = match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(decoded) => decoded.claims,
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    return Err(TokenError::Expired);
                }
                _ => return Err(TokenError::Invalid(e.to_string())),
            },
        };

        if claims.typ != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.typ,
            });
        }
        if claims.sub.trim().is_empty() {
            return Err(TokenError::Invalid("missing subject".into()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, "HS256", Duration::minutes(15), Duration::days(30))
            .expect("HS256 is supported")
    }

    #[test]
    fn access_token_round_trips() {
        let tokens = service("secret");
        let token = tokens.issue("user-1", TokenKind::Access).unwrap();
        let claims = tokens.validate(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.typ, TokenKind::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn pair_is_bearer_and_kinds_differ() {
        let tokens = service("secret");
        let pair = tokens.issue_pair("user-2").unwrap();
        assert_eq!(pair.token_type, "bearer");
        assert!(tokens.validate(&pair.refresh_token, TokenKind::Refresh).is_ok());
        assert!(matches!(
            tokens.validate(&pair.refresh_token, TokenKind::Access),
            Err(TokenError::WrongKind {
                expected: TokenKind::Access,
                found: TokenKind::Refresh
            })
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = service("one").issue("user", TokenKind::Access).unwrap();
        assert!(matches!(
            service("two").validate(&token, TokenKind::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let tokens = TokenService::new(
            "secret",
            "HS256",
            Duration::seconds(-120),
            Duration::days(1),
        )
        .unwrap();
        let token = tokens.issue("user", TokenKind::Access).unwrap();
        assert!(matches!(
            tokens.validate(&token, TokenKind::Access),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            service("secret").validate("not-a-jwt", TokenKind::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn asymmetric_algorithms_are_refused() {
        let err = TokenService::new("s", "RS256", Duration::minutes(1), Duration::days(1))
            .unwrap_err();
        assert!(matches!(err, TokenError::UnsupportedAlgorithm(alg) if alg == "RS256"));
    }
}
