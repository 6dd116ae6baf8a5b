// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL extraction from free text.

use std::sync::LazyLock;

use regex::Regex;

/// `http` or `https`, then everything up to the next whitespace.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL pattern is valid"));

/// Returns every URL found in `text`, left to right.
///
/// Matching is permissive: trailing punctuation, brackets and tracking
/// parameters are kept as-is and left for the bookmarking service to judge.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
