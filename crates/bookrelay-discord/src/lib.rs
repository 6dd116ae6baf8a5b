// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord adapter for Bookrelay.
//!
//! - [`DiscordListener`] connects to the gateway and hands every message in
//!   the monitored channel to a [`LiveIngestor`](bookrelay_ingest::LiveIngestor).
//! - [`DiscordHistory`] pages through a channel's past messages over the REST
//!   API and implements [`MessageHistory`](bookrelay_core::MessageHistory).

pub mod convert;
pub mod history;
pub mod listener;

pub use history::{ChannelPages, DiscordHistory, PageCursor, PageSource};
pub use listener::DiscordListener;

use bookrelay_core::RelayError;

/// Wraps a serenity error as a channel error.
pub(crate) fn channel_error(context: &str, e: serenity::Error) -> RelayError {
    RelayError::Channel {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}
