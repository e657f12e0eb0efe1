use api_shared::{
    BookingRes, ChatRoomCreateReq, ChatRoomRes, ErrorRes, MessageCreateReq, MessageRes,
};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::RouterExt;
use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .collection("/chat/rooms", get(list_rooms).post(open_room))
        .route("/chat/rooms/:id/messages", get(list_messages).post(send_message))
        .route("/chat/rooms/:id/accept-price", post(accept_price))
}

#[utoipa::path(
    post,
    path = "/chat/rooms/",
    tag = "chat",
    security(("bearer" = [])),
    request_body = ChatRoomCreateReq,
    responses(
        (status = 200, description = "The room", body = ChatRoomRes),
        (status = 403, description = "The caller did not post the request", body = ErrorRes),
        (status = 404, description = "Unknown request or professional", body = ErrorRes)
    )
)]
/// Opens (or returns the existing) negotiation between the caller and a professional.
///
/// # Returns
/// * `Ok(Json<ChatRoomRes>)` - The room, with both participants' names
///
/// # Errors
/// - `403 Forbidden` if the caller did not post the request
/// - `404 Not Found` for an unknown request or professional
async fn open_room(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChatRoomCreateReq>,
) -> ApiResult<Json<ChatRoomRes>> {
    Ok(Json(state.chat.open_room(&user, &req).await?))
}

#[utoipa::path(
    get,
    path = "/chat/rooms/",
    tag = "chat",
    security(("bearer" = [])),
    responses((status = 200, description = "Rooms the caller takes part in", body = [ChatRoomRes]))
)]
/// Rooms the caller takes part in, newest first, with their last message.
///
/// # Returns
/// * `Ok(Json<Vec<ChatRoomRes>>)` - The caller's rooms
async fn list_rooms(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ChatRoomRes>>> {
    Ok(Json(state.chat.list_rooms(&user.id).await?))
}

#[utoipa::path(
    get,
    path = "/chat/rooms/{id}/messages",
    tag = "chat",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Room id")),
    responses(
        (status = 200, description = "Messages, oldest first", body = [MessageRes]),
        (status = 403, description = "Not a participant", body = ErrorRes),
        (status = 404, description = "Chat room not found", body = ErrorRes)
    )
)]
/// Conversation history of a room, oldest first.
///
/// # Returns
/// * `Ok(Json<Vec<MessageRes>>)` - Every message in the room
async fn list_messages(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(room_id): Path<String>,
) -> ApiResult<Json<Vec<MessageRes>>> {
    let rows = state.chat.messages(&room_id, &user.id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/chat/rooms/{id}/messages",
    tag = "chat",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Room id")),
    request_body = MessageCreateReq,
    responses(
        (status = 200, description = "Message stored", body = MessageRes),
        (status = 400, description = "Room closed or proposal without price", body = ErrorRes),
        (status = 403, description = "Not a participant", body = ErrorRes)
    )
)]
/// Posts a message, or a price proposal, and notifies the other participant.
///
/// # Returns
/// * `Ok(Json<MessageRes>)` - The stored message
///
/// # Errors
/// Returns `400 Bad Request` if the room is closed or a proposal carries no positive price.
async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(room_id): Path<String>,
    Json(req): Json<MessageCreateReq>,
) -> ApiResult<Json<MessageRes>> {
    Ok(Json(state.chat.send_message(&room_id, &user, &req).await?.into()))
}

#[utoipa::path(
    post,
    path = "/chat/rooms/{id}/accept-price",
    tag = "chat",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Room id")),
    responses(
        (status = 200, description = "Confirmed booking", body = BookingRes),
        (status = 400, description = "Nothing to accept, own proposal, or room closed", body = ErrorRes)
    )
)]
/// Accepts the latest price proposal and turns the negotiation into a booking.
///
/// # Returns
/// * `Ok(Json<BookingRes>)` - The confirmed booking at the agreed price
///
/// # Errors
/// Returns `400 Bad Request` if there is nothing to accept, the caller made the proposal, or
/// the room is already closed.
async fn accept_price(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(room_id): Path<String>,
) -> ApiResult<Json<BookingRes>> {
    let booking = state.chat.accept_price(&room_id, &user).await?;
    tracing::info!(booking_id = %booking.id, %room_id, "price accepted");
    Ok(Json(booking.into()))
}
