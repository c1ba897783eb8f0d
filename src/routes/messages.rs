// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Messaging routes: inbox/sent views, replies, read tracking, and the
//! live subscription socket.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::message::{unread_count, Message};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/messages/inbox", get(inbox))
        .route("/api/messages/sent", get(sent))
        .route("/api/messages/unread_count", get(unread))
        .route("/api/messages/ws", get(subscribe_ws))
        .route("/api/messages", post(send_message))
        .route("/api/messages/{id}/reply", post(reply))
        .route("/api/messages/{id}/read", post(mark_read))
        .route("/api/messages/{id}", delete(delete_message))
        .route("/api/flats/{id}/messages", get(conversation))
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub id: String,
    pub flat_id: String,
    pub sender_id: String,
    pub sender_email: String,
    pub recipient_id: String,
    /// Falls back to "unknown" for records that predate the field
    pub recipient_email: String,
    pub body: String,
    pub created_at: String,
    pub read: bool,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            recipient_email: message.recipient_display().to_string(),
            id: message.id,
            flat_id: message.flat_id,
            sender_id: message.sender_id,
            sender_email: message.sender_email,
            recipient_id: message.recipient_id,
            body: message.body,
            created_at: message.created_at,
            read: message.read,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessagesResponse {
    pub messages: Vec<MessageResponse>,
}

fn messages_response(messages: Vec<Message>) -> Json<MessagesResponse> {
    Json(MessagesResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    })
}

// ─── One-shot views ──────────────────────────────────────────

async fn inbox(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessagesResponse>> {
    Ok(messages_response(state.messaging.inbox(&user.uid).await?))
}

async fn sent(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessagesResponse>> {
    Ok(messages_response(state.messaging.sent(&user.uid).await?))
}

/// The conversation about one flat, oldest first.
async fn conversation(
    State(state): State<Arc<AppState>>,
    Path(flat_id): Path<String>,
) -> Result<Json<MessagesResponse>> {
    Ok(messages_response(
        state.messaging.conversation(&flat_id).await?,
    ))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UnreadResponse {
    pub count: usize,
}

/// Unread badge count.
async fn unread(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UnreadResponse>> {
    Ok(Json(UnreadResponse {
        count: state.messaging.unread(&user.uid).await?,
    }))
}

// ─── Mutations ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub flat_id: String,
    pub body: String,
}

/// Message a flat's owner about their listing.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>> {
    let message = state
        .messaging
        .send(&request.flat_id, &user, &request.body)
        .await?;
    Ok(Json(message.into()))
}

#[derive(Deserialize)]
pub struct ReplyRequest {
    pub body: String,
}

async fn reply(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(message_id): Path<String>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<MessageResponse>> {
    let message = state
        .messaging
        .reply(&message_id, &user, &request.body)
        .await?;
    Ok(Json(message.into()))
}

/// Opening a message marks it read (view-as-side-effect).
async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let message = state.messaging.mark_read(&message_id, &user.uid).await?;
    Ok(Json(message.into()))
}

#[derive(Serialize)]
pub struct DeleteMessageResponse {
    pub success: bool,
}

async fn delete_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<DeleteMessageResponse>> {
    state.messaging.delete(&message_id, &user.uid).await?;
    Ok(Json(DeleteMessageResponse { success: true }))
}

// ─── Live subscription ───────────────────────────────────────

/// A frame pushed to live subscribers. Each frame replaces the matching
/// client-side list wholesale.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame {
    Inbox {
        messages: Vec<MessageResponse>,
        unread: usize,
    },
    Sent {
        messages: Vec<MessageResponse>,
    },
}

impl Frame {
    fn inbox(uid: &str, messages: Vec<Message>) -> Self {
        let unread = unread_count(&messages, uid);
        Frame::Inbox {
            messages: messages.into_iter().map(MessageResponse::from).collect(),
            unread,
        }
    }

    fn sent(messages: Vec<Message>) -> Self {
        Frame::Sent {
            messages: messages.into_iter().map(MessageResponse::from).collect(),
        }
    }
}

/// Upgrade to the live message subscription.
async fn subscribe_ws(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

async fn send_frame(sender: &mut SplitSink<WebSocket, WsMessage>, frame: &Frame) -> bool {
    match serde_json::to_string(frame) {
        Ok(text) => sender.send(WsMessage::Text(text.into())).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize subscription frame");
            false
        }
    }
}

/// Drive one live subscription: an initial snapshot of both lists, then
/// a full re-delivery whenever a relevant mutation lands. The
/// subscription ends when the client goes away; dropping the handles
/// closes the feed receivers.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user: AuthUser) {
    let (mut sender, mut receiver) = socket.split();

    let mut inbox_sub = state.messaging.subscribe_inbox(&user.uid);
    let mut sent_sub = state.messaging.subscribe_sent(&user.uid);

    tracing::debug!(uid = %user.uid, "Message subscription opened");

    // Initial snapshot
    match inbox_sub.current().await {
        Ok(messages) => {
            if !send_frame(&mut sender, &Frame::inbox(&user.uid, messages)).await {
                return;
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load initial inbox");
            return;
        }
    }
    match sent_sub.current().await {
        Ok(messages) => {
            if !send_frame(&mut sender, &Frame::sent(messages)).await {
                return;
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load initial sent list");
            return;
        }
    }

    loop {
        tokio::select! {
            update = inbox_sub.next() => match update {
                Some(Ok(messages)) => {
                    if !send_frame(&mut sender, &Frame::inbox(&user.uid, messages)).await {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Inbox re-query failed, closing subscription");
                    break;
                }
                None => break,
            },
            update = sent_sub.next() => match update {
                Some(Ok(messages)) => {
                    if !send_frame(&mut sender, &Frame::sent(messages)).await {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Sent re-query failed, closing subscription");
                    break;
                }
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {} // nothing to handle from the client
                Some(Err(_)) => break,
            },
        }
    }

    tracing::debug!(uid = %user.uid, "Message subscription closed");
}
