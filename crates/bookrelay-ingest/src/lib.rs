// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL ingestion for Bookrelay.
//!
//! Two independent consumers feed the bookmark sink:
//! - [`BacklogImporter`] reads a channel's history once, orders the URLs it
//!   finds and delivers them in paced batches.
//! - [`LiveIngestor`] saves URLs from newly posted messages as they arrive,
//!   without batching or pacing.

pub mod backlog;
pub mod live;

pub use backlog::{BacklogImporter, ImportEntry, ImportReport, ImportSettings};
pub use live::LiveIngestor;
