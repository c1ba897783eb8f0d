// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Messaging: listing conversations, read tracking, live subscriptions.
//!
//! Every mutation publishes an event on a process-wide broadcast feed.
//! Live subscriptions re-deliver the full matching result set on every
//! relevant event (wholesale replacement, no diffing); dropping the
//! subscription handle closes the channel.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::message::{unread_count, Message};
use crate::time_utils;
use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 256;

/// What happened to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageEventKind {
    Created,
    Read,
    Deleted,
}

/// A message mutation, as published on the feed.
///
/// Carries both participants so subscribers can decide relevance without
/// re-reading the message.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub message_id: String,
    pub flat_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub kind: MessageEventKind,
}

impl MessageEvent {
    /// Whether this event changes `uid`'s inbox.
    pub fn concerns_inbox_of(&self, uid: &str) -> bool {
        self.recipient_id == uid
    }

    /// Whether this event changes `uid`'s sent list.
    pub fn concerns_sent_of(&self, uid: &str) -> bool {
        self.sender_id == uid
    }

    fn from_message(message: &Message, kind: MessageEventKind) -> Self {
        Self {
            message_id: message.id.clone(),
            flat_id: message.flat_id.clone(),
            sender_id: message.sender_id.clone(),
            recipient_id: message.recipient_id.clone(),
            kind,
        }
    }
}

/// Process-wide broadcast feed of message mutations.
#[derive(Clone)]
pub struct MessageFeed {
    tx: broadcast::Sender<MessageEvent>,
}

impl MessageFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Publish an event. Send errors only mean nobody is listening.
    pub fn publish(&self, event: MessageEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.tx.subscribe()
    }
}

impl Default for MessageFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Which list a subscription mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubscriptionScope {
    Inbox,
    Sent,
}

/// A live subscription over one user's inbox or sent list.
///
/// Each call to [`next`](Self::next) waits for a relevant mutation and
/// then yields the full current result set. A lagged receiver resyncs by
/// re-querying immediately.
pub struct MessageSubscription {
    rx: broadcast::Receiver<MessageEvent>,
    db: FirestoreDb,
    uid: String,
    scope: SubscriptionScope,
}

impl MessageSubscription {
    pub async fn next(&mut self) -> Option<Result<Vec<Message>, AppError>> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    let relevant = match self.scope {
                        SubscriptionScope::Inbox => event.concerns_inbox_of(&self.uid),
                        SubscriptionScope::Sent => event.concerns_sent_of(&self.uid),
                    };
                    if relevant {
                        return Some(self.current().await);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(uid = %self.uid, skipped, "Subscription lagged, resyncing");
                    return Some(self.current().await);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The full current result set for this subscription.
    pub async fn current(&self) -> Result<Vec<Message>, AppError> {
        match self.scope {
            SubscriptionScope::Inbox => self.db.messages_for_recipient(&self.uid).await,
            SubscriptionScope::Sent => self.db.messages_for_sender(&self.uid).await,
        }
    }
}

/// Messaging operations against the backend.
#[derive(Clone)]
pub struct MessagingService {
    db: FirestoreDb,
    feed: MessageFeed,
}

impl MessagingService {
    pub fn new(db: FirestoreDb, feed: MessageFeed) -> Self {
        Self { db, feed }
    }

    /// Messages addressed to `uid`, newest first.
    pub async fn inbox(&self, uid: &str) -> Result<Vec<Message>, AppError> {
        self.db.messages_for_recipient(uid).await
    }

    /// Messages sent by `uid`, newest first.
    pub async fn sent(&self, uid: &str) -> Result<Vec<Message>, AppError> {
        self.db.messages_for_sender(uid).await
    }

    /// The conversation about one flat, oldest first.
    pub async fn conversation(&self, flat_id: &str) -> Result<Vec<Message>, AppError> {
        self.db.messages_for_flat(flat_id).await
    }

    /// Unread badge count for `uid`.
    pub async fn unread(&self, uid: &str) -> Result<usize, AppError> {
        let inbox = self.db.messages_for_recipient(uid).await?;
        Ok(unread_count(&inbox, uid))
    }

    /// Open a live subscription over `uid`'s inbox.
    pub fn subscribe_inbox(&self, uid: &str) -> MessageSubscription {
        MessageSubscription {
            rx: self.feed.subscribe(),
            db: self.db.clone(),
            uid: uid.to_string(),
            scope: SubscriptionScope::Inbox,
        }
    }

    /// Open a live subscription over `uid`'s sent list.
    pub fn subscribe_sent(&self, uid: &str) -> MessageSubscription {
        MessageSubscription {
            rx: self.feed.subscribe(),
            db: self.db.clone(),
            uid: uid.to_string(),
            scope: SubscriptionScope::Sent,
        }
    }

    /// Send a message about a flat. The flat's owner is the recipient.
    pub async fn send(
        &self,
        flat_id: &str,
        sender: &AuthUser,
        body: &str,
    ) -> Result<Message, AppError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::BadRequest(
                "Message content cannot be empty".to_string(),
            ));
        }

        let flat = self
            .db
            .get_flat(flat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flat {} not found", flat_id)))?;

        // Older records sometimes lack the recipient email; populate it
        // when the profile is readable, otherwise leave it unset.
        let recipient_email = self
            .db
            .get_user(&flat.owner_id)
            .await?
            .map(|profile| profile.email);

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            flat_id: flat.id.clone(),
            sender_id: sender.uid.clone(),
            sender_email: sender.email.clone(),
            recipient_id: flat.owner_id.clone(),
            recipient_email,
            body: body.to_string(),
            created_at: time_utils::format_utc_rfc3339(chrono::Utc::now()),
            read: false,
        };

        self.db.upsert_message(&message).await?;
        self.feed
            .publish(MessageEvent::from_message(&message, MessageEventKind::Created));
        Ok(message)
    }

    /// Reply to a received message: sender and recipient swap, the flat
    /// id carries over, and the new message starts unread.
    pub async fn reply(
        &self,
        original_id: &str,
        sender: &AuthUser,
        body: &str,
    ) -> Result<Message, AppError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::BadRequest(
                "Message content cannot be empty".to_string(),
            ));
        }

        let original = self
            .db
            .get_message(original_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", original_id)))?;

        if original.recipient_id != sender.uid && original.sender_id != sender.uid {
            return Err(AppError::Forbidden);
        }

        let (recipient_id, recipient_email) = if original.sender_id == sender.uid {
            (original.recipient_id.clone(), original.recipient_email.clone())
        } else {
            (
                original.sender_id.clone(),
                Some(original.sender_email.clone()),
            )
        };

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            flat_id: original.flat_id.clone(),
            sender_id: sender.uid.clone(),
            sender_email: sender.email.clone(),
            recipient_id,
            recipient_email,
            body: body.to_string(),
            created_at: time_utils::format_utc_rfc3339(chrono::Utc::now()),
            read: false,
        };

        self.db.upsert_message(&message).await?;
        self.feed
            .publish(MessageEvent::from_message(&message, MessageEventKind::Created));
        Ok(message)
    }

    /// Mark a message read. Idempotent: an already-read message is
    /// returned unchanged with no write and no event.
    pub async fn mark_read(&self, message_id: &str, reader_uid: &str) -> Result<Message, AppError> {
        let mut message = self
            .db
            .get_message(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", message_id)))?;

        if message.recipient_id != reader_uid {
            return Err(AppError::Forbidden);
        }

        if message.read {
            return Ok(message);
        }

        message.read = true;
        self.db.upsert_message(&message).await?;
        self.feed
            .publish(MessageEvent::from_message(&message, MessageEventKind::Read));
        Ok(message)
    }

    /// Delete a message. Either participant may delete unilaterally.
    pub async fn delete(&self, message_id: &str, actor_uid: &str) -> Result<(), AppError> {
        let message = self
            .db
            .get_message(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", message_id)))?;

        if message.sender_id != actor_uid && message.recipient_id != actor_uid {
            return Err(AppError::Forbidden);
        }

        self.db.delete_message(message_id).await?;
        self.feed
            .publish(MessageEvent::from_message(&message, MessageEventKind::Deleted));
        Ok(())
    }
}
