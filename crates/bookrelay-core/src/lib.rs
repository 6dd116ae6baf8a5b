// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Bookrelay.
//!
//! Holds the workspace error type, the message and bookmark data model, the
//! URL extractor, and the two seams the sync engine is built around:
//! [`BookmarkSink`] (where URLs go) and [`MessageHistory`] (where backlog
//! messages come from).

pub mod error;
pub mod extract;
pub mod text;
pub mod traits;
pub mod types;

pub use error::RelayError;
pub use extract::extract_urls;
pub use traits::{BookmarkSink, MessageHistory};
pub use types::{AuthScheme, BookmarkRequest, ChatMessage, HistoryQuery, SaveOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_error_has_all_variants() {
        let _config = RelayError::Config("test".into());
        let _auth = RelayError::Auth {
            message: "test".into(),
            status: Some(401),
            source: None,
        };
        let _http = RelayError::Http {
            message: "test".into(),
            source: None,
        };
        let _channel = RelayError::Channel {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
    }

    #[test]
    fn auth_error_display_includes_message() {
        let err = RelayError::Auth {
            message: "login rejected: bad password".into(),
            status: Some(401),
            source: None,
        };
        let text = err.to_string();
        assert!(text.contains("authentication failed"), "got: {text}");
        assert!(text.contains("bad password"), "got: {text}");
    }

    #[test]
    fn auth_scheme_round_trips_through_strings() {
        use std::str::FromStr;

        for scheme in [
            AuthScheme::Bearer,
            AuthScheme::QueryToken,
            AuthScheme::SessionHeader,
        ] {
            let s = scheme.to_string();
            assert_eq!(AuthScheme::from_str(&s).expect("should parse back"), scheme);
        }
        assert_eq!(AuthScheme::QueryToken.to_string(), "query-token");
    }

    #[test]
    fn auth_scheme_serializes_kebab_case() {
        let json = serde_json::to_string(&AuthScheme::SessionHeader).unwrap();
        assert_eq!(json, "\"session-header\"");
    }
}
