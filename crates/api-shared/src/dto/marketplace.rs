use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sns_types::{RecurrencePattern, RequestStatus, Urgency};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CategoryRes {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceRequestCreateReq {
    pub category_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub photos: Vec<String>,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub urgency: Urgency,
}

/// Partial update of a service request. Absent fields are left unchanged; `null` clears the
/// coordinates or the schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ServiceRequestUpdateReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub photos: Option<Vec<String>>,
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>, nullable)]
    pub latitude: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>, nullable)]
    pub longitude: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, format = DateTime, nullable)]
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    pub urgency: Option<Urgency>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ServiceRequestRes {
    pub id: String,
    pub customer_id: String,
    pub category_id: String,
    pub title: String,
    pub description: String,
    pub photos: Vec<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub urgency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct OpenRequestsQuery {
    /// Restrict to one category id
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DescriptionValidationReq {
    pub category_id: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DescriptionValidationRes {
    pub is_valid: bool,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityCreateReq {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: Option<RecurrencePattern>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityUpdateReq {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<RecurrencePattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AvailabilityRes {
    pub id: String,
    pub professional_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewCreateReq {
    pub booking_id: String,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReviewRes {
    pub id: String,
    pub booking_id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CustomerDashboardRes {
    pub active_requests: i64,
    pub upcoming_bookings: i64,
    pub completed_bookings: i64,
    pub total_spent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProDashboardRes {
    pub active_jobs: i64,
    pub pending_requests: i64,
    pub completed_jobs: i64,
    pub total_earnings: f64,
    pub rating: f64,
    pub reviews_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationUpdateReq {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LocationUpdateRes {
    pub status: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
pub struct PaymentIntentQuery {
    pub booking_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PaymentIntentRes {
    pub client_secret: String,
    pub payment_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_create_defaults_to_immediate_without_photos() {
        let req: ServiceRequestCreateReq = serde_json::from_str(
            r#"{"category_id":"plumbing","title":"Leak","description":"Sink leaking","location":"Jaipur"}"#,
        )
        .unwrap();
        assert_eq!(req.urgency, Urgency::Immediate);
        assert!(req.photos.is_empty());
        assert!(req.scheduled_at.is_none());
    }

    #[test]
    fn request_update_can_clear_schedule() {
        let req: ServiceRequestUpdateReq =
            serde_json::from_str(r#"{"scheduled_at":null,"title":"Leak"}"#).unwrap();
        assert_eq!(req.scheduled_at, Some(None));
        assert_eq!(req.latitude, None);
        assert_eq!(req.title.as_deref(), Some("Leak"));
    }

    #[test]
    fn availability_create_parses_pattern() {
        let req: AvailabilityCreateReq = serde_json::from_str(
            r#"{"date":"2026-02-14","start_time":"14:00","end_time":"17:00","is_recurring":true,"recurrence_pattern":"weekdays"}"#,
        )
        .unwrap();
        assert_eq!(req.recurrence_pattern, Some(RecurrencePattern::Weekdays));
    }
}
