//! Runtime configuration.
//!
//! Settings are resolved once at process startup and then passed into services. Nothing reads
//! process-wide environment variables during request handling.

use crate::constants::*;
use crate::{CoreError, CoreResult};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Settings resolved at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    pub api_v1_str: String,
    pub project_name: String,
    pub bind_addr: SocketAddr,
    pub web_concurrency: usize,
    pub database_url: String,
    pub db_pool_size: u32,
    pub db_max_overflow: u32,
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub stripe_secret_key: String,
    pub stripe_publishable_key: String,
    pub backend_cors_origins: Vec<String>,
    pub upload_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary key lookup, falling back to defaults for absent or
    /// blank keys. Malformed values are rejected rather than silently defaulted.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());

        let web_concurrency = parse_or(&get, "WEB_CONCURRENCY", DEFAULT_WEB_CONCURRENCY)?;
        if web_concurrency == 0 {
            return Err(CoreError::Config(
                "WEB_CONCURRENCY must be at least 1".into(),
            ));
        }

        let db_pool_size = parse_or(&get, "DB_POOL_SIZE", DEFAULT_DB_POOL_SIZE)?;
        if db_pool_size == 0 {
            return Err(CoreError::Config("DB_POOL_SIZE must be at least 1".into()));
        }

        let api_v1_str = text("API_V1_STR", DEFAULT_API_V1_STR);
        let api_v1_str = api_v1_str.trim_end_matches('/').to_owned();
        if !api_v1_str.starts_with('/') {
            return Err(CoreError::Config(format!(
                "API_V1_STR must start with '/' and name a path: {api_v1_str:?}"
            )));
        }

        let secret_key = text("SECRET_KEY", DEFAULT_SECRET_KEY);

        let raw_bind = text("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr: SocketAddr = raw_bind
            .trim()
            .parse()
            .map_err(|e| CoreError::Config(format!("BIND_ADDR={raw_bind}: {e}")))?;

        Ok(Self {
            api_v1_str,
            project_name: text("PROJECT_NAME", DEFAULT_PROJECT_NAME),
            bind_addr,
            web_concurrency,
            database_url: text("DATABASE_URL", DEFAULT_DATABASE_URL),
            db_pool_size,
            db_max_overflow: parse_or(&get, "DB_MAX_OVERFLOW", DEFAULT_DB_MAX_OVERFLOW)?,
            secret_key,
            algorithm: text("ALGORITHM", DEFAULT_ALGORITHM),
            access_token_expire_minutes: parse_positive(
                &get,
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            )?,
            refresh_token_expire_days: parse_positive(
                &get,
                "REFRESH_TOKEN_EXPIRE_DAYS",
                DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS,
            )?,
            stripe_secret_key: text("STRIPE_SECRET_KEY", DEFAULT_STRIPE_SECRET_KEY),
            stripe_publishable_key: text("STRIPE_PUBLISHABLE_KEY", DEFAULT_STRIPE_PUBLISHABLE_KEY),
            backend_cors_origins: match get("BACKEND_CORS_ORIGINS") {
                Some(raw) => parse_cors_origins(&raw)?,
                None => Vec::new(),
            },
            upload_dir: PathBuf::from(text("UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
        })
    }

    /// Upper bound on pooled database connections.
    pub fn max_connections(&self) -> u32 {
        self.db_pool_size + self.db_max_overflow
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// `uploads/docs`, which must exist before the server accepts traffic.
    pub fn upload_docs_dir(&self) -> PathBuf {
        self.upload_dir.join(UPLOAD_DOCS_SUBDIR)
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_expire_minutes)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_expire_days)
    }

    /// Whether payments go through the in-process gateway instead of Stripe.
    pub fn uses_mock_payments(&self) -> bool {
        self.stripe_secret_key.starts_with(MOCK_STRIPE_KEY_PREFIX)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> CoreResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CoreError::Config(format!("{key}={raw}: {e}"))),
        None => Ok(default),
    }
}

fn parse_positive<G>(get: &G, key: &str, default: i64) -> CoreResult<i64>
where
    G: Fn(&str) -> Option<String>,
{
    let value = parse_or(get, key, default)?;
    if value <= 0 {
        return Err(CoreError::Config(format!("{key} must be positive")));
    }
    Ok(value)
}

/// Parse `BACKEND_CORS_ORIGINS`, which is either a comma separated list or a JSON array.
pub fn parse_cors_origins(raw: &str) -> CoreResult<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        let origins: Vec<String> = serde_json::from_str(trimmed)
            .map_err(|e| CoreError::Config(format!("BACKEND_CORS_ORIGINS: {e}")))?;
        return Ok(origins);
    }
    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> CoreResult<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_bind_port_10000_with_four_workers() {
        let s = settings(&[]).expect("defaults should resolve");
        assert_eq!(s.bind_addr.to_string(), "0.0.0.0:10000");
        assert_eq!(s.web_concurrency, 4);
        assert_eq!(s.upload_docs_dir(), PathBuf::from("uploads").join("docs"));
        assert_eq!(s.max_connections(), 30);
        assert_eq!(s.api_v1_str, "/api/v1");
        assert!(s.uses_mock_payments());
    }

    #[test]
    fn overrides_are_applied() {
        let s = settings(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("WEB_CONCURRENCY", "2"),
            ("UPLOAD_DIR", "/srv/media"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "60"),
            ("STRIPE_SECRET_KEY", "sk_live_abc"),
        ])
        .expect("overrides should resolve");
        assert_eq!(s.bind_addr.port(), 8080);
        assert_eq!(s.web_concurrency, 2);
        assert_eq!(s.upload_docs_dir(), PathBuf::from("/srv/media/docs"));
        assert_eq!(s.access_token_ttl(), chrono::Duration::minutes(60));
        assert!(!s.uses_mock_payments());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let s = settings(&[("WEB_CONCURRENCY", "  ")]).expect("blank should default");
        assert_eq!(s.web_concurrency, 4);
    }

    #[test]
    fn rejects_zero_workers() {
        let err = settings(&[("WEB_CONCURRENCY", "0")]).unwrap_err();
        assert!(err.to_string().contains("WEB_CONCURRENCY"));
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(settings(&[("DB_POOL_SIZE", "many")]).is_err());
        assert!(settings(&[("BIND_ADDR", "not-an-address")]).is_err());
        assert!(settings(&[("REFRESH_TOKEN_EXPIRE_DAYS", "-1")]).is_err());
    }

    #[test]
    fn api_prefix_must_be_a_rooted_path() {
        let s = settings(&[("API_V1_STR", "/v2/")]).expect("trailing slash is trimmed");
        assert_eq!(s.api_v1_str, "/v2");
        assert!(settings(&[("API_V1_STR", "api")]).is_err());
        assert!(settings(&[("API_V1_STR", "/")]).is_err());
    }

    #[test]
    fn cors_origins_accept_both_formats() {
        assert_eq!(
            parse_cors_origins("http://a.test, http://b.test").unwrap(),
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(
            parse_cors_origins(r#"["http://a.test"]"#).unwrap(),
            vec!["http://a.test"]
        );
        assert!(parse_cors_origins("[oops").is_err());
    }
}
