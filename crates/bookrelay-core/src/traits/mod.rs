// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the sync engine and its collaborators.
//!
//! Both use `#[async_trait]` or boxed streams so they can be used as trait
//! objects by the binary and replaced by mocks in tests.

pub mod history;
pub mod sink;

pub use history::MessageHistory;
pub use sink::BookmarkSink;
