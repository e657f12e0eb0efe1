use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sns_types::MessageType;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRoomCreateReq {
    pub request_id: String,
    pub professional_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ChatRoomRes {
    pub id: String,
    pub request_id: String,
    pub customer_id: String,
    pub professional_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<String>,
    pub professional_name: Option<String>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageCreateReq {
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    /// Required when `message_type` is `price_proposal`
    #[serde(default)]
    pub proposed_price: Option<f64>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MessageRes {
    pub id: String,
    pub chat_room_id: String,
    pub sender_id: String,
    pub content: String,
    pub message_type: String,
    pub proposed_price: Option<f64>,
    pub media_url: Option<String>,
    pub duration: Option<f64>,
    pub created_at: DateTime<Utc>,
}
