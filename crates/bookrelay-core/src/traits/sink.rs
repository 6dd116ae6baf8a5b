// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destination for extracted URLs.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::types::BookmarkRequest;

/// Something that can durably store one bookmark.
#[async_trait]
pub trait BookmarkSink: Send + Sync {
    /// Saves one bookmark.
    ///
    /// Returns `Ok(true)` when persisted and `Ok(false)` when the save failed
    /// after the sink's own retries. `Err` is reserved for conditions that
    /// make every further save pointless, such as an exhausted login.
    async fn save(&self, request: &BookmarkRequest) -> Result<bool, RelayError>;
}
