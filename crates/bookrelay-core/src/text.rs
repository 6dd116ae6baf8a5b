// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small text helpers for log output.

/// Shortens `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
