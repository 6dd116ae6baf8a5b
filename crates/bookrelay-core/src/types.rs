// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the sync engine, the chat adapters and the binary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A chat message as seen by the sync engine, independent of the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Platform message identifier.
    pub id: String,
    /// Display name of the author.
    pub author: String,
    /// True when the message was posted by this bot's own account.
    pub from_self: bool,
    /// Raw message text.
    pub content: String,
    /// Creation time of the message.
    pub created_at: DateTime<Utc>,
}

/// One unit of work for the bookmarking service.
///
/// `url` is taken verbatim from the source text. No normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl BookmarkRequest {
    /// A request with no excerpt.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            excerpt: None,
        }
    }

    /// Attach the originating message text. Blank text is ignored.
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        let excerpt = excerpt.into();
        self.excerpt = if excerpt.trim().is_empty() {
            None
        } else {
            Some(excerpt)
        };
        self
    }
}

/// Result of one attempt, or of a whole save, against the bookmarking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The bookmark was persisted.
    Success,
    /// Likely to succeed on retry (5xx, timeout, connection reset).
    TransientFailure(String),
    /// Not worth retrying (rejected request).
    TerminalFailure(String),
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Success)
    }

    /// The failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            SaveOutcome::Success => None,
            SaveOutcome::TransientFailure(r) | SaveOutcome::TerminalFailure(r) => Some(r),
        }
    }
}

/// Parameters for historical message retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Maximum number of messages to return.
    pub limit: Option<usize>,
    /// Only return messages created after this instant.
    pub after: Option<DateTime<Utc>>,
    /// Return oldest messages first instead of newest first.
    pub oldest_first: bool,
}

/// How the session token is presented on a bookmark save request.
///
/// Schemes are tried in the configured order; the client moves to the next one
/// only when a freshly issued token is still rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `?token=<token>` on the request URL.
    QueryToken,
    /// `X-Session-Id: <token>`
    SessionHeader,
}

impl AuthScheme {
    /// All schemes in their default fallback order.
    pub const ALL: [AuthScheme; 3] = [
        AuthScheme::Bearer,
        AuthScheme::QueryToken,
        AuthScheme::SessionHeader,
    ];
}
