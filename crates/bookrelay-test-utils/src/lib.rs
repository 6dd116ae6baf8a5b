// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Bookrelay integration tests.
//!
//! Provides in-memory stand-ins for the bookmarking service and the chat
//! history so the sync engine can be tested without network access.
//!
//! # Components
//!
//! - [`MockSink`] - Records bookmark requests and answers from a script
//! - [`MockHistory`] - Serves a fixed set of messages through the history seam
//! - [`fixtures`] - Message builders

pub mod fixtures;
pub mod mock_history;
pub mod mock_sink;

pub use fixtures::{chat_message, message_from_self};
pub use mock_history::MockHistory;
pub use mock_sink::{MockSink, ScriptedSave};
