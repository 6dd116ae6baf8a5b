// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory message history.

use futures::stream::{self, BoxStream, StreamExt};

use bookrelay_core::{ChatMessage, HistoryQuery, MessageHistory, RelayError};

/// Serves a fixed message list, honouring the query the way a chat platform
/// does: cutoff and ordering are applied before the limit.
#[derive(Debug, Clone, Default)]
pub struct MockHistory {
    messages: Vec<ChatMessage>,
    fail_after: Option<usize>,
}

impl MockHistory {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            fail_after: None,
        }
    }

    /// Ends the stream with a channel error after `count` messages.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

impl MessageHistory for MockHistory {
    fn history(&self, query: HistoryQuery) -> BoxStream<'_, Result<ChatMessage, RelayError>> {
        let mut selected: Vec<ChatMessage> = self
            .messages
            .iter()
            .filter(|m| query.after.is_none_or(|after| m.created_at > after))
            .cloned()
            .collect();

        selected.sort_by_key(|m| m.created_at);
        if !query.oldest_first {
            selected.reverse();
        }
        if let Some(limit) = query.limit {
            selected.truncate(limit);
        }

        let mut items: Vec<Result<ChatMessage, RelayError>> =
            selected.into_iter().map(Ok).collect();
        if let Some(count) = self.fail_after {
            items.truncate(count);
            items.push(Err(RelayError::Channel {
                message: "history unavailable".into(),
                source: None,
            }));
        }

        stream::iter(items).boxed()
    }
}
