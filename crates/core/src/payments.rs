//! Payment gateway abstraction and webhook event parsing.
//!
//! [`StripeGateway`] talks to the Stripe REST API. [`MockGateway`] fabricates intents locally
//! and is selected when the configured secret key is a mock key.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Settings;
use crate::constants::STRIPE_API_BASE;
use crate::{CoreError, CoreResult};

/// Parameters for a new payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRequest {
    /// Amount in the currency's minor unit (paise for INR).
    pub amount: i64,
    pub currency: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + fmt::Debug {
    /// Create a payment intent. Provider failures are reported as [`CoreError::Gateway`].
    async fn create_intent(&self, req: &IntentRequest) -> CoreResult<PaymentIntent>;
}

/// Stripe's REST API, authenticated with the secret key.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_base_url(secret_key, STRIPE_API_BASE)
    }

    pub fn with_base_url(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, req: &IntentRequest) -> CoreResult<PaymentIntent> {
        let mut form = vec![
            ("amount".to_owned(), req.amount.to_string()),
            ("currency".to_owned(), req.currency.clone()),
        ];
        form.extend(
            req.metadata
                .iter()
                .map(|(k, v)| (format!("metadata[{k}]"), v.clone())),
        );

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| CoreError::Gateway(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            return Err(CoreError::Gateway(message));
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| CoreError::Gateway(e.to_string()))
    }
}

/// Local gateway for development and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockGateway;

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(&self, req: &IntentRequest) -> CoreResult<PaymentIntent> {
        if req.amount <= 0 {
            return Err(CoreError::Gateway("amount must be positive".into()));
        }
        let id = format!("pi_mock_{}", uuid::Uuid::new_v4().simple());
        tracing::info!(intent = %id, amount = req.amount, currency = %req.currency, "[MOCK STRIPE] payment intent created");
        Ok(PaymentIntent {
            client_secret: format!("{id}_secret_mock"),
            id,
        })
    }
}

/// Gateway selected by the configured secret key.
pub fn gateway_for(settings: &Settings) -> Arc<dyn PaymentGateway> {
    if settings.uses_mock_payments() {
        Arc::new(MockGateway)
    } else {
        Arc::new(StripeGateway::new(settings.stripe_secret_key.clone()))
    }
}

/// Price in rupees to paise.
pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

/// What an incoming webhook asks us to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Succeeded { intent_id: String },
    Failed { intent_id: String },
    Ignored { kind: String },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<RawEventData>,
}

#[derive(Deserialize)]
struct RawEventData {
    object: RawEventObject,
}

#[derive(Deserialize)]
struct RawEventObject {
    id: String,
}

/// Parse a webhook payload. Malformed JSON, or a payment event without an intent id, is
/// rejected.
pub fn parse_webhook(payload: &[u8]) -> CoreResult<WebhookEvent> {
    let event: RawEvent =
        serde_json::from_slice(payload).map_err(|e| CoreError::invalid(e.to_string()))?;

    let intent_id = || {
        event
            .data
            .as_ref()
            .map(|d| d.object.id.clone())
            .ok_or_else(|| CoreError::invalid("event is missing data.object.id"))
    };

    match event.kind.as_str() {
        "payment_intent.succeeded" => Ok(WebhookEvent::Succeeded {
            intent_id: intent_id()?,
        }),
        "payment_intent.payment_failed" => Ok(WebhookEvent::Failed {
            intent_id: intent_id()?,
        }),
        _ => Ok(WebhookEvent::Ignored {
            kind: event.kind.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_succeeded_event() {
        let event = parse_webhook(
            br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_123","amount":50000}}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            WebhookEvent::Succeeded {
                intent_id: "pi_123".into()
            }
        );
    }

    #[test]
    fn parses_failed_event() {
        let event = parse_webhook(
            br#"{"type":"payment_intent.payment_failed","data":{"object":{"id":"pi_9"}}}"#,
        )
        .unwrap();
        assert!(matches!(event, WebhookEvent::Failed { intent_id } if intent_id == "pi_9"));
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let event = parse_webhook(br#"{"type":"charge.refunded"}"#).unwrap();
        assert_eq!(
            event,
            WebhookEvent::Ignored {
                kind: "charge.refunded".into()
            }
        );
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            parse_webhook(b"not json"),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(parse_webhook(br#"{"type":"payment_intent.succeeded"}"#).is_err());
    }

    #[test]
    fn minor_units_round_to_nearest() {
        assert_eq!(to_minor_units(500.0), 50_000);
        assert_eq!(to_minor_units(19.99), 1_999);
        assert_eq!(to_minor_units(0.0), 0);
    }

    #[tokio::test]
    async fn mock_gateway_issues_matching_secret() {
        let intent = MockGateway
            .create_intent(&IntentRequest {
                amount: 100,
                currency: "inr".into(),
                metadata: BTreeMap::new(),
            })
            .await
            .unwrap();
        assert!(intent.id.starts_with("pi_mock_"));
        assert_eq!(intent.client_secret, format!("{}_secret_mock", intent.id));
    }
}
