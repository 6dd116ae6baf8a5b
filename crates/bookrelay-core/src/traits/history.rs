// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source of historical chat messages.

use futures::stream::BoxStream;

use crate::error::RelayError;
use crate::types::{ChatMessage, HistoryQuery};

/// A lazily paged view over a channel's past messages.
pub trait MessageHistory: Send + Sync {
    /// Streams messages matching `query`.
    ///
    /// Without `oldest_first` the order is newest first. The stream ends after
    /// the first error.
    fn history(&self, query: HistoryQuery) -> BoxStream<'_, Result<ChatMessage, RelayError>>;
}
