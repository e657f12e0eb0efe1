//! One-time passcodes for phone verification.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sns_types::DeliveryMethod;
use sqlx::PgPool;

use crate::constants::{OTP_LENGTH, OTP_TTL_MINUTES};
use crate::models::new_id;
use crate::CoreResult;

/// Random numeric code of `OTP_LENGTH` digits, leading zeros allowed.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(OTP_TTL_MINUTES)
}

#[derive(Clone, Debug)]
pub struct OtpService {
    pool: PgPool,
}

impl OtpService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Generate, store and deliver a code for `phone`. Returns the code.
    pub async fn send(&self, phone: &str, method: DeliveryMethod) -> CoreResult<String> {
        let code = generate_code();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO otp_verifications (id, phone, otp_code, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(new_id())
        .bind(phone)
        .bind(&code)
        .bind(expiry_from(now))
        .bind(now)
        .execute(&self.pool)
        .await?;

        deliver(phone, &code, method);
        Ok(code)
    }

    /// Consume a valid unexpired code. Returns `false` when none matches.
    ///
    /// Lookup and deletion are one statement; of two concurrent callers with the same code,
    /// only one sees it.
    pub async fn verify(&self, phone: &str, code: &str) -> CoreResult<bool> {
        let consumed: Option<String> = sqlx::query_scalar(
            "DELETE FROM otp_verifications
             WHERE id = (
                 SELECT id FROM otp_verifications
                 WHERE phone = $1 AND otp_code = $2 AND expires_at > NOW()
                 ORDER BY created_at DESC LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING id",
        )
        .bind(phone)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(consumed.is_some())
    }
}

fn deliver(phone: &str, code: &str, method: DeliveryMethod) {
    match method {
        DeliveryMethod::Sms => tracing::info!(%phone, %code, "[MOCK SMS] sending OTP"),
        DeliveryMethod::Whatsapp => tracing::info!(%phone, %code, "[MOCK WHATSAPP] sending OTP"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn codes_expire_after_ten_minutes() {
        let now = Utc::now();
        assert_eq!(expiry_from(now) - now, Duration::minutes(10));
    }
}
