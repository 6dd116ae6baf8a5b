// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message builders.

use bookrelay_core::ChatMessage;
use chrono::{DateTime, Utc};

/// A message from another user.
pub fn chat_message(id: u64, content: &str, created_at: DateTime<Utc>) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        author: format!("user{id}"),
        from_self: false,
        content: content.to_string(),
        created_at,
    }
}

/// A message posted by the bot's own account.
pub fn message_from_self(id: u64, content: &str, created_at: DateTime<Utc>) -> ChatMessage {
    ChatMessage {
        author: "bookrelay".to_string(),
        from_self: true,
        ..chat_message(id, content, created_at)
    }
}
