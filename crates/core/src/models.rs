//! Database rows and their conversion into wire types.
//!
//! Enumerated columns are stored as text and kept as `String` on the row; the typed enums from
//! `sns-types` are parsed on demand where business rules depend on them.

use api_shared::{
    AvailabilityRes, BookingRes, CategoryRes, ChatRoomRes, DeviceTokenRes, MessageRes,
    ProProfileRes, ReviewRes, ServiceRequestRes, UserRes,
};
use chrono::{DateTime, Utc};
use sns_types::{BookingStatus, MessageType, PaymentStatus, RequestStatus, UserRole};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::CoreResult;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub role: String,
    pub service_category: Option<String>,
    pub bio: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub profile_photo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> CoreResult<UserRole> {
        Ok(self.role.parse()?)
    }

    pub fn is_pro(&self) -> bool {
        self.role == UserRole::Pro.as_str()
    }

    /// Attach computed marketplace statistics.
    pub fn into_profile(self, stats: ProStats) -> ProProfileRes {
        ProProfileRes {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            phone: self.phone,
            role: self.role,
            service_category: self.service_category,
            bio: self.bio,
            address: self.address,
            profile_photo: self.profile_photo,
            is_active: self.is_active,
            created_at: self.created_at,
            rating: stats.rating,
            jobs_completed: stats.jobs_completed,
            reviews_count: stats.reviews_count,
            match_score: None,
            match_reason: None,
        }
    }
}

impl From<UserRow> for UserRes {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            role: row.role,
            service_category: row.service_category,
            bio: row.bio,
            latitude: row.latitude,
            longitude: row.longitude,
            address: row.address,
            profile_photo: row.profile_photo,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Review and job statistics shown on a professional's profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProStats {
    /// Average received rating rounded to one decimal; `0.0` without reviews.
    pub rating: f64,
    pub jobs_completed: i64,
    pub reviews_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: Option<String>,
}

impl From<CategoryRow> for CategoryRes {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            icon: row.icon,
            color: row.color,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequestRow {
    pub id: String,
    pub customer_id: String,
    pub category_id: String,
    pub title: String,
    pub description: String,
    pub photos: Json<Vec<String>>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub urgency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequestRow {
    pub fn status(&self) -> CoreResult<RequestStatus> {
        Ok(self.status.parse()?)
    }
}

impl From<ServiceRequestRow> for ServiceRequestRes {
    fn from(row: ServiceRequestRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            category_id: row.category_id,
            title: row.title,
            description: row.description,
            photos: row.photos.0,
            location: row.location,
            latitude: row.latitude,
            longitude: row.longitude,
            scheduled_at: row.scheduled_at,
            urgency: row.urgency,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AvailabilityRow {
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

impl From<AvailabilityRow> for AvailabilityRes {
    fn from(row: AvailabilityRow) -> Self {
        Self {
            id: row.id,
            professional_id: row.professional_id,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            is_recurring: row.is_recurring,
            recurrence_pattern: row.recurrence_pattern,
            is_booked: row.is_booked,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatRoomRow {
    pub id: String,
    pub request_id: String,
    pub customer_id: String,
    pub professional_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ChatRoomRow {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.customer_id == user_id || self.professional_id == user_id
    }

    /// The participant who is not `user_id`.
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.customer_id == user_id {
            &self.professional_id
        } else {
            &self.customer_id
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == sns_types::ChatRoomStatus::Closed.as_str()
    }
}

/// Chat room joined with its latest message and both participants' names.
#[derive(Debug, Clone, FromRow)]
pub struct ChatRoomSummaryRow {
    #[sqlx(flatten)]
    pub room: ChatRoomRow,
    pub last_message: Option<String>,
    pub professional_name: Option<String>,
    pub customer_name: Option<String>,
}

impl From<ChatRoomSummaryRow> for ChatRoomRes {
    fn from(row: ChatRoomSummaryRow) -> Self {
        Self {
            id: row.room.id,
            request_id: row.room.request_id,
            customer_id: row.room.customer_id,
            professional_id: row.room.professional_id,
            status: row.room.status,
            created_at: row.room.created_at,
            last_message: row.last_message,
            professional_name: row.professional_name,
            customer_name: row.customer_name,
        }
    }
}

impl From<ChatRoomRow> for ChatRoomRes {
    fn from(room: ChatRoomRow) -> Self {
        ChatRoomSummaryRow {
            room,
            last_message: None,
            professional_name: None,
            customer_name: None,
        }
        .into()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
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

impl MessageRow {
    pub fn message_type(&self) -> CoreResult<MessageType> {
        Ok(self.message_type.parse()?)
    }
}

impl From<MessageRow> for MessageRes {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            chat_room_id: row.chat_room_id,
            sender_id: row.sender_id,
            content: row.content,
            message_type: row.message_type,
            proposed_price: row.proposed_price,
            media_url: row.media_url,
            duration: row.duration,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
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

impl BookingRow {
    pub fn status(&self) -> CoreResult<BookingStatus> {
        Ok(self.status.parse()?)
    }

    pub fn is_customer(&self, user_id: &str) -> bool {
        self.customer_id == user_id
    }

    pub fn is_professional(&self, user_id: &str) -> bool {
        self.professional_id.as_deref() == Some(user_id)
    }

    pub fn is_party(&self, user_id: &str) -> bool {
        self.is_customer(user_id) || self.is_professional(user_id)
    }

    /// The other party of the booking, if there is one.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        if self.is_customer(user_id) {
            self.professional_id.as_deref()
        } else {
            Some(&self.customer_id)
        }
    }
}

impl From<BookingRow> for BookingRes {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            request_id: row.request_id,
            customer_id: row.customer_id,
            professional_id: row.professional_id,
            agreed_price: row.agreed_price,
            status: row.status,
            scheduled_at: row.scheduled_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
        }
    }
}

/// Review joined with the reviewer's display name.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: String,
    pub booking_id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewer_name: Option<String>,
}

impl From<ReviewRow> for ReviewRes {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            reviewer_id: row.reviewer_id,
            reviewee_id: row.reviewee_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            reviewer_name: row.reviewer_name,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DeviceTokenRow {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub platform: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeviceTokenRow> for DeviceTokenRes {
    fn from(row: DeviceTokenRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            platform: row.platform,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: String,
    pub booking_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub stripe_payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRow {
    pub fn status(&self) -> CoreResult<PaymentStatus> {
        Ok(self.status.parse()?)
    }
}

/// Fresh UUID v4 string used as a primary key.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
