use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sns_types::BookingStatus;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BookingRes {
    pub id: String,
    pub request_id: String,
    pub customer_id: String,
    pub professional_id: Option<String>,
    pub agreed_price: f64,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingStatusUpdateReq {
    pub status: BookingStatus,
}
