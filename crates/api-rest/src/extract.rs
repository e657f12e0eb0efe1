//! Bearer-token extractors.
//!
//! Handlers take [`CurrentUser`] to require any signed-in account, or [`CurrentCustomer`] /
//! [`CurrentPro`] to require a role as well.

use api_shared::TokenKind;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sns_core::models::UserRow;
use sns_core::repositories::users::INACTIVE_USER;
use sns_types::UserRole;

use crate::error::ApiError;
use crate::state::AppState;

/// The active account the access token belongs to.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRow);

#[derive(Debug, Clone)]
pub struct CurrentCustomer(pub UserRow);

#[derive(Debug, Clone)]
pub struct CurrentPro(pub UserRow);

/// Token from an `Authorization: Bearer <token>` header. The scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(&parts.headers).ok_or_else(ApiError::credentials)?;
        let claims = state.tokens.validate(token, TokenKind::Access)?;

        let user = state
            .users
            .find(&claims.sub)
            .await?
            .ok_or_else(ApiError::credentials)?;
        if !user.is_active {
            return Err(ApiError::bad_request(INACTIVE_USER));
        }
        Ok(Self(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentCustomer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_role(&user, UserRole::Customer)?;
        Ok(Self(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentPro {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_role(&user, UserRole::Pro)?;
        Ok(Self(user))
    }
}

fn require_role(user: &UserRow, role: UserRole) -> Result<(), ApiError> {
    if user.role == role.as_str() {
        Ok(())
    } else {
        Err(ApiError::privileges())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_static(value));
        map
    }

    #[test]
    fn reads_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
    }

    #[test]
    fn rejects_other_schemes_and_blank_tokens() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
