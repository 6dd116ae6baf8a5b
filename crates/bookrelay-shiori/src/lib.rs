// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shiori bookmarking service client for Bookrelay.
//!
//! - [`SessionManager`] logs in and keeps the session token.
//! - [`BookmarkClient`] saves URLs with retry, token refresh and fallback
//!   auth schemes, and implements [`BookmarkSink`](bookrelay_core::BookmarkSink).

pub mod client;
pub mod session;
pub mod types;

pub use client::{BookmarkClient, Endpoints, RetryPolicy};
pub use session::{Credentials, SessionManager, SessionPolicy};
