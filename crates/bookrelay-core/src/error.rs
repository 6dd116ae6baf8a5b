// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Bookrelay.

use thiserror::Error;

/// The error type shared by every Bookrelay crate.
///
/// Per-URL save failures are not errors: they are reported as
/// [`SaveOutcome`](crate::types::SaveOutcome) values. Only conditions that
/// must stop a whole run (no session, broken configuration, dead message
/// source) travel as `RelayError`.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The bookmarking service refused to issue a session after all attempts.
    #[error("authentication failed: {message}")]
    Auth {
        message: String,
        /// Last HTTP status observed, if the failure came from a response.
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport-level HTTP errors (client construction, unreadable bodies).
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chat platform errors (gateway connection, history retrieval).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RelayError {
    /// Returns true if this error means no session could be obtained.
    pub fn is_auth(&self) -> bool {
        matches!(self, RelayError::Auth { .. })
    }
}
