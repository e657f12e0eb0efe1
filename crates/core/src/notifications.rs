//! Push notifications to a user's registered devices.
//!
//! Delivery goes through a [`PushSender`]. The shipped [`LogPushSender`] records each
//! multicast in the log instead of contacting a push provider. Notification failures are
//! logged and never surface to the caller whose action triggered them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use api_shared::DeviceTokenCreateReq;
use async_trait::async_trait;
use sns_types::MessageType;
use sqlx::PgPool;

use crate::models::{new_id, DeviceTokenRow};
use crate::CoreResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Free-form string payload delivered alongside the notification.
    pub data: BTreeMap<String, String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_owned(), value.into());
        self
    }

    /// Notice for a new chat message. Non-text messages are summarised by type.
    pub fn chat_message(
        sender_name: &str,
        room_id: &str,
        message_type: MessageType,
        content: &str,
    ) -> Self {
        let body = match message_type {
            MessageType::Text => content.to_owned(),
            other => format!("Sent a {other}"),
        };
        Self::new(format!("Message from {sender_name}"), body)
            .with("chat_id", room_id)
            .with("type", "new_message")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("push delivery failed: {0}")]
pub struct PushError(pub String);

/// Transport for multicast push notifications.
#[async_trait]
pub trait PushSender: Send + Sync + fmt::Debug {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &Notification,
    ) -> Result<(), PushError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &Notification,
    ) -> Result<(), PushError> {
        tracing::info!(
            devices = tokens.len(),
            title = %notification.title,
            body = %notification.body,
            data = ?notification.data,
            "[MOCK PUSH]"
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct NotificationService {
    pool: PgPool,
    sender: Arc<dyn PushSender>,
}

impl NotificationService {
    pub fn new(pool: PgPool, sender: Arc<dyn PushSender>) -> Self {
        Self { pool, sender }
    }

    /// Register a device for `user_id`. A token already known for another user moves to
    /// `user_id`.
    pub async fn register_device(
        &self,
        user_id: &str,
        req: &DeviceTokenCreateReq,
    ) -> CoreResult<DeviceTokenRow> {
        let row = sqlx::query_as::<_, DeviceTokenRow>(
            "INSERT INTO device_tokens (id, user_id, token, platform)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (token) DO UPDATE
                SET user_id = EXCLUDED.user_id,
                    updated_at = CASE
                        WHEN device_tokens.user_id = EXCLUDED.user_id THEN device_tokens.updated_at
                        ELSE NOW()
                    END
             RETURNING *",
        )
        .bind(new_id())
        .bind(user_id)
        .bind(&req.token)
        .bind(req.platform.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn device_tokens(&self, user_id: &str) -> CoreResult<Vec<String>> {
        Ok(
            sqlx::query_scalar("SELECT token FROM device_tokens WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Deliver `notification` to every device of `user_id`. Never fails.
    pub async fn send_to_user(&self, user_id: &str, notification: Notification) {
        let tokens = match self.device_tokens(user_id).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!(%user_id, error = %e, "failed to load device tokens");
                return;
            }
        };
        if tokens.is_empty() {
            return;
        }
        if let Err(e) = self.sender.send_multicast(&tokens, &notification).await {
            tracing::error!(%user_id, error = %e, "failed to send notification");
        }
    }
}
