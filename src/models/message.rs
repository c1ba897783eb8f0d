// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Message model for listing conversations.

use serde::{Deserialize, Serialize};

/// A message between a flat's owner and an interested user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Document ID
    pub id: String,
    /// The flat this conversation is about
    pub flat_id: String,
    pub sender_id: String,
    /// Sender email, denormalized for display
    pub sender_email: String,
    pub recipient_id: String,
    /// Recipient email; older records may not carry it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    pub body: String,
    pub created_at: String,
    /// Set once the recipient has opened the message; never reset
    #[serde(default)]
    pub read: bool,
}

impl Message {
    /// Recipient email for display, falling back when the record predates
    /// the field.
    pub fn recipient_display(&self) -> &str {
        self.recipient_email.as_deref().unwrap_or("unknown")
    }
}

/// Count unread messages addressed to `uid`.
pub fn unread_count(messages: &[Message], uid: &str) -> usize {
    messages
        .iter()
        .filter(|m| m.recipient_id == uid && !m.read)
        .count()
}
