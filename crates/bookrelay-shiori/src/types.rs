// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Shiori HTTP API.

use serde::Serialize;
use serde_json::Value;

/// Body of `POST {base}/auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub remember: bool,
}

/// A parsed login response.
///
/// Shiori versions disagree on where the session token lives, so the body is
/// kept as raw JSON and searched by [`LoginResponse::token`].
#[derive(Debug, Clone)]
pub struct LoginResponse(pub Value);

impl LoginResponse {
    /// Returns the session token, checking in order: top-level `session`,
    /// top-level `token`, nested `message.token`. The first non-empty string
    /// wins.
    pub fn token(&self) -> Option<&str> {
        let Value::Object(body) = &self.0 else {
            return None;
        };

        [
            body.get("session"),
            body.get("token"),
            body.get("message").and_then(|m| m.get("token")),
        ]
        .into_iter()
        .flatten()
        .find_map(non_empty_str)
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Body of `POST {root}/api/bookmarks`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkPayload<'a> {
    pub url: &'a str,
    pub create_archive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<&'a str>,
}

impl<'a> BookmarkPayload<'a> {
    /// Builds the payload; an excerpt brings the `public` and `tags` fields along.
    pub fn new(url: &'a str, excerpt: Option<&'a str>) -> Self {
        match excerpt {
            Some(excerpt) => Self {
                url,
                create_archive: true,
                public: Some(0),
                tags: Some(Vec::new()),
                excerpt: Some(excerpt),
            },
            None => Self {
                url,
                create_archive: true,
                public: None,
                tags: None,
                excerpt: None,
            },
        }
    }
}
