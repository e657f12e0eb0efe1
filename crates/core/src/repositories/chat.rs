//! Negotiation chat between a customer and a professional.
//!
//! Either side may propose a price. When the other side accepts the latest proposal the room
//! closes and a confirmed booking is created at that price.

use api_shared::{ChatRoomCreateReq, ChatRoomRes, MessageCreateReq};
use chrono::Utc;
use sns_types::{BookingStatus, ChatRoomStatus, MessageType, RequestStatus};
use sqlx::{PgExecutor, PgPool};

use crate::models::{new_id, BookingRow, ChatRoomRow, ChatRoomSummaryRow, MessageRow, UserRow};
use crate::notifications::{Notification, NotificationService};
use crate::repositories::requests::{self, RequestService};
use crate::repositories::users::UserService;
use crate::{CoreError, CoreResult};

pub const ROOM_NOT_FOUND: &str = "Chat room not found";
pub const ROOM_CLOSED: &str = "Chat room is closed";
pub const PROPOSAL_NEEDS_PRICE: &str = "Price proposal requires a proposed_price";
pub const NO_PROPOSAL: &str = "No price proposal found to accept";
pub const OWN_PROPOSAL: &str = "Cannot accept your own proposal";

/// Check a message before it is posted to `room`.
pub fn check_outgoing(room: &ChatRoomRow, req: &MessageCreateReq) -> CoreResult<()> {
    if room.is_closed() {
        return Err(CoreError::invalid(ROOM_CLOSED));
    }
    if req.message_type == MessageType::PriceProposal
        && !req.proposed_price.is_some_and(|p| p.is_finite() && p > 0.0)
    {
        return Err(CoreError::invalid(PROPOSAL_NEEDS_PRICE));
    }
    Ok(())
}

/// Decide whether `acceptor_id` may accept `latest_proposal`, returning the agreed price.
pub fn check_acceptance(
    room: &ChatRoomRow,
    latest_proposal: Option<&MessageRow>,
    acceptor_id: &str,
) -> CoreResult<f64> {
    if room.is_closed() {
        return Err(CoreError::invalid(ROOM_CLOSED));
    }
    let proposal = latest_proposal.ok_or_else(|| CoreError::invalid(NO_PROPOSAL))?;
    if proposal.sender_id == acceptor_id {
        return Err(CoreError::invalid(OWN_PROPOSAL));
    }
    proposal
        .proposed_price
        .ok_or_else(|| CoreError::invalid(NO_PROPOSAL))
}

/// `500` renders as `500`, `499.5` as `499.5`.
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{price:.0}")
    } else {
        price.to_string()
    }
}

struct NewMessage<'a> {
    room_id: &'a str,
    sender_id: &'a str,
    content: &'a str,
    message_type: MessageType,
    proposed_price: Option<f64>,
    media_url: Option<&'a str>,
    duration: Option<f64>,
}

impl<'a> NewMessage<'a> {
    fn plain(room_id: &'a str, sender_id: &'a str, content: &'a str, message_type: MessageType) -> Self {
        Self {
            room_id,
            sender_id,
            content,
            message_type,
            proposed_price: None,
            media_url: None,
            duration: None,
        }
    }
}

async fn insert_message<'e, E>(executor: E, msg: NewMessage<'_>) -> CoreResult<MessageRow>
where
    E: PgExecutor<'e>,
{
    Ok(sqlx::query_as::<_, MessageRow>(
        "INSERT INTO messages
            (id, chat_room_id, sender_id, content, message_type, proposed_price, media_url,
             duration, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(new_id())
    .bind(msg.room_id)
    .bind(msg.sender_id)
    .bind(msg.content)
    .bind(msg.message_type.as_str())
    .bind(msg.proposed_price)
    .bind(msg.media_url)
    .bind(msg.duration)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?)
}

#[derive(Clone, Debug)]
pub struct ChatService {
    pool: PgPool,
    notifier: NotificationService,
}

impl ChatService {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self { pool, notifier }
    }

    /// Open (or reopen the existing) room between `customer` and a professional about a request.
    ///
    /// Only the customer who posted the request may open rooms for it. Concurrent calls for the
    /// same triple share one room; the opening message and the move to `matched` happen once.
    pub async fn open_room(
        &self,
        customer: &UserRow,
        req: &ChatRoomCreateReq,
    ) -> CoreResult<ChatRoomRes> {
        let request = RequestService::new(self.pool.clone())
            .find(&req.request_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Service request not found"))?;
        if request.customer_id != customer.id {
            return Err(CoreError::forbidden("Not authorized"));
        }

        let professional = UserService::new(self.pool.clone())
            .find(&req.professional_id)
            .await?
            .filter(|u| u.is_pro() && u.is_active)
            .ok_or_else(|| CoreError::not_found("Professional not found"))?;

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query_as::<_, ChatRoomRow>(
            "INSERT INTO chat_rooms (id, request_id, customer_id, professional_id, status)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (request_id, customer_id, professional_id) DO NOTHING
             RETURNING *",
        )
        .bind(new_id())
        .bind(&request.id)
        .bind(&customer.id)
        .bind(&professional.id)
        .bind(ChatRoomStatus::Active.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let room = match inserted {
            Some(room) => {
                let opening = format!("Chat started for: {}", request.title);
                insert_message(
                    &mut *tx,
                    NewMessage::plain(&room.id, &customer.id, &opening, MessageType::System),
                )
                .await?;

                if request.status()? == RequestStatus::Open {
                    requests::set_status(&mut *tx, &request.id, RequestStatus::Matched).await?;
                }
                tx.commit().await?;
                tracing::info!(room_id = %room.id, request_id = %request.id, "chat room opened");
                room
            }
            None => {
                tx.rollback().await?;
                sqlx::query_as::<_, ChatRoomRow>(
                    "SELECT * FROM chat_rooms
                     WHERE request_id = $1 AND customer_id = $2 AND professional_id = $3",
                )
                .bind(&request.id)
                .bind(&customer.id)
                .bind(&professional.id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        let mut res = ChatRoomRes::from(room);
        res.professional_name = Some(professional.full_name);
        res.customer_name = Some(customer.full_name.clone());
        Ok(res)
    }

    /// Rooms where `user_id` is either party, newest first.
    pub async fn list_rooms(&self, user_id: &str) -> CoreResult<Vec<ChatRoomRes>> {
        let rows = sqlx::query_as::<_, ChatRoomSummaryRow>(
            "SELECT r.*,
                    (SELECT m.content FROM messages m
                      WHERE m.chat_room_id = r.id
                      ORDER BY m.created_at DESC LIMIT 1) AS last_message,
                    p.full_name AS professional_name,
                    c.full_name AS customer_name
             FROM chat_rooms r
             LEFT JOIN users p ON p.id = r.professional_id
             LEFT JOIN users c ON c.id = r.customer_id
             WHERE r.customer_id = $1 OR r.professional_id = $1
             ORDER BY r.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ChatRoomRes::from).collect())
    }

    async fn require_participant(&self, room_id: &str, user_id: &str) -> CoreResult<ChatRoomRow> {
        let room = sqlx::query_as::<_, ChatRoomRow>("SELECT * FROM chat_rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(ROOM_NOT_FOUND))?;
        if !room.is_participant(user_id) {
            return Err(CoreError::forbidden("Not authorized"));
        }
        Ok(room)
    }

    /// Conversation history, oldest first.
    pub async fn messages(&self, room_id: &str, user_id: &str) -> CoreResult<Vec<MessageRow>> {
        self.require_participant(room_id, user_id).await?;
        Ok(sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages WHERE chat_room_id = $1 ORDER BY created_at, id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn send_message(
        &self,
        room_id: &str,
        sender: &UserRow,
        req: &MessageCreateReq,
    ) -> CoreResult<MessageRow> {
        let room = self.require_participant(room_id, &sender.id).await?;
        check_outgoing(&room, req)?;

        let message = insert_message(
            &self.pool,
            NewMessage {
                proposed_price: req.proposed_price,
                media_url: req.media_url.as_deref(),
                duration: req.duration,
                ..NewMessage::plain(room_id, &sender.id, &req.content, req.message_type)
            },
        )
        .await?;

        self.notifier
            .send_to_user(
                room.counterpart(&sender.id),
                Notification::chat_message(
                    &sender.full_name,
                    room_id,
                    req.message_type,
                    &req.content,
                ),
            )
            .await;
        Ok(message)
    }

    /// Accept the latest price proposal, closing the room and booking the job.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] when the room is closed, holds no proposal, or the
    /// latest proposal was made by `acceptor`.
    pub async fn accept_price(&self, room_id: &str, acceptor: &UserRow) -> CoreResult<BookingRow> {
        self.require_participant(room_id, &acceptor.id).await?;

        let mut tx = self.pool.begin().await?;
        let room = sqlx::query_as::<_, ChatRoomRow>(
            "SELECT * FROM chat_rooms WHERE id = $1 FOR UPDATE",
        )
        .bind(room_id)
        .fetch_one(&mut *tx)
        .await?;

        let proposal = sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages
             WHERE chat_room_id = $1 AND message_type = 'price_proposal'
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(room_id)
        .fetch_optional(&mut *tx)
        .await?;
        let price = check_acceptance(&room, proposal.as_ref(), &acceptor.id)?;

        let accepted = format!("Price accepted: ₹{}", format_price(price));
        insert_message(
            &mut *tx,
            NewMessage {
                proposed_price: Some(price),
                ..NewMessage::plain(room_id, &acceptor.id, &accepted, MessageType::PriceAccept)
            },
        )
        .await?;

        sqlx::query("UPDATE chat_rooms SET status = $2 WHERE id = $1")
            .bind(room_id)
            .bind(ChatRoomStatus::Closed.as_str())
            .execute(&mut *tx)
            .await?;

        let request = sqlx::query_as::<_, crate::models::ServiceRequestRow>(
            "SELECT * FROM service_requests WHERE id = $1",
        )
        .bind(&room.request_id)
        .fetch_optional(&mut *tx)
        .await?;
        if request.is_some() {
            requests::set_status(&mut *tx, &room.request_id, RequestStatus::Booked).await?;
        }

        let booking = sqlx::query_as::<_, BookingRow>(
            "INSERT INTO bookings
                (id, request_id, customer_id, professional_id, agreed_price, status, scheduled_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(new_id())
        .bind(&room.request_id)
        .bind(&room.customer_id)
        .bind(&room.professional_id)
        .bind(price)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(request.as_ref().and_then(|r| r.scheduled_at))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(booking_id = %booking.id, room_id, price, "price accepted, booking confirmed");

        let title = request.map(|r| r.title).unwrap_or_default();
        self.notifier
            .send_to_user(
                &room.customer_id,
                Notification::new(
                    "Booking Confirmed!",
                    format!(
                        "Your service request '{title}' is confirmed at ₹{}",
                        format_price(price)
                    ),
                )
                .with("booking_id", booking.id.clone())
                .with("type", "booking_confirmed"),
            )
            .await;

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(status: &str) -> ChatRoomRow {
        ChatRoomRow {
            id: "room".into(),
            request_id: "req".into(),
            customer_id: "cust".into(),
            professional_id: "pro".into(),
            status: status.into(),
            created_at: Utc::now(),
        }
    }

    fn proposal(sender: &str, price: f64) -> MessageRow {
        MessageRow {
            id: "m".into(),
            chat_room_id: "room".into(),
            sender_id: sender.into(),
            content: "How about this?".into(),
            message_type: "price_proposal".into(),
            proposed_price: Some(price),
            media_url: None,
            duration: None,
            created_at: Utc::now(),
        }
    }

    fn outgoing(message_type: MessageType, price: Option<f64>) -> MessageCreateReq {
        MessageCreateReq {
            content: "hi".into(),
            message_type,
            proposed_price: price,
            media_url: None,
            duration: None,
        }
    }

    #[test]
    fn counterpart_accepts_latest_price() {
        let p = proposal("pro", 750.0);
        assert_eq!(check_acceptance(&room("active"), Some(&p), "cust").unwrap(), 750.0);
    }

    #[test]
    fn proposer_cannot_accept_own_price() {
        let p = proposal("pro", 750.0);
        let err = check_acceptance(&room("active"), Some(&p), "pro").unwrap_err();
        assert_eq!(err.to_string(), OWN_PROPOSAL);
    }

    #[test]
    fn acceptance_needs_a_proposal_and_an_open_room() {
        let err = check_acceptance(&room("active"), None, "cust").unwrap_err();
        assert_eq!(err.to_string(), NO_PROPOSAL);

        let p = proposal("pro", 750.0);
        let err = check_acceptance(&room("closed"), Some(&p), "cust").unwrap_err();
        assert_eq!(err.to_string(), ROOM_CLOSED);
    }

    #[test]
    fn proposals_need_a_positive_price() {
        let open = room("active");
        assert!(check_outgoing(&open, &outgoing(MessageType::Text, None)).is_ok());
        assert!(check_outgoing(&open, &outgoing(MessageType::PriceProposal, Some(500.0))).is_ok());
        for price in [None, Some(0.0), Some(-5.0), Some(f64::NAN)] {
            let err = check_outgoing(&open, &outgoing(MessageType::PriceProposal, price)).unwrap_err();
            assert_eq!(err.to_string(), PROPOSAL_NEEDS_PRICE);
        }
    }

    #[test]
    fn closed_rooms_reject_messages() {
        let err = check_outgoing(&room("closed"), &outgoing(MessageType::Text, None)).unwrap_err();
        assert_eq!(err.to_string(), ROOM_CLOSED);
    }

    #[test]
    fn prices_format_without_trailing_zeroes() {
        assert_eq!(format_price(500.0), "500");
        assert_eq!(format_price(499.5), "499.5");
    }
}
