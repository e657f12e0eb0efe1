//! Password hashing and token service construction.
//!
//! Passwords are stored as bcrypt hashes (`$2b$<cost>$...`). Hashing is deliberately slow,
//! so request handlers go through [`hash_password_async`] and [`verify_password_async`],
//! which run on the blocking thread pool.

use api_shared::TokenService;

use crate::config::Settings;
use crate::constants::BCRYPT_COST;
use crate::CoreResult;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> CoreResult<String> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

pub async fn hash_password_async(password: String) -> CoreResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

pub async fn verify_password_async(password: String, stored: String) -> CoreResult<bool> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await?)
}

/// Build the JWT service from settings.
pub fn token_service(settings: &Settings) -> CoreResult<TokenService> {
    Ok(TokenService::new(
        &settings.secret_key,
        &settings.algorithm,
        settings.access_token_ttl(),
        settings.refresh_token_ttl(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$2b$"));
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
    }

    #[test]
    fn hashes_use_configured_cost() {
        let hash = hash_password("pw").unwrap();
        assert_eq!(&hash[4..6], format!("{BCRYPT_COST:02}"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn malformed_hashes_are_rejected() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "plain"));
        assert!(!verify_password("pw", "md5$00$00"));
        assert!(!verify_password("pw", "$2b$12$short"));
    }

    #[tokio::test]
    async fn off_thread_helpers_agree_with_sync_ones() {
        let hash = hash_password_async("secret".into()).await.unwrap();
        assert!(verify_password_async("secret".into(), hash.clone()).await.unwrap());
        assert!(!verify_password_async("Secret".into(), hash).await.unwrap());
    }

    #[test]
    fn token_service_rejects_asymmetric_algorithm() {
        let mut settings = Settings::from_lookup(|_| None).unwrap();
        settings.algorithm = "RS256".into();
        assert!(token_service(&settings).is_err());
        settings.algorithm = "HS256".into();
        assert!(token_service(&settings).is_ok());
    }
}
