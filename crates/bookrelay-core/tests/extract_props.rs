// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for URL extraction.

use bookrelay_core::extract_urls;
use proptest::prelude::*;

fn url_strategy() -> impl Strategy<Value = String> {
    ("https?", "[a-z]{1,10}\\.[a-z]{2,3}", "(/[a-zA-Z0-9_?=&.-]{0,12})?")
        .prop_map(|(scheme, host, path)| format!("{scheme}://{host}{path}"))
}

fn word_strategy() -> impl Strategy<Value = String> {
    // Plain words never contain a scheme.
    "[a-gi-z,.!]{1,8}"
}

proptest! {
    #[test]
    fn finds_every_url_between_words(
        parts in prop::collection::vec(
            prop_oneof![url_strategy().prop_map(Some), word_strategy().prop_map(|_| None)],
            0..12,
        ),
        words in prop::collection::vec(word_strategy(), 12),
    ) {
        let mut text = Vec::new();
        let mut expected = Vec::new();
        for (i, part) in parts.iter().enumerate() {
            match part {
                Some(url) => {
                    text.push(url.clone());
                    expected.push(url.clone());
                }
                None => text.push(words[i].clone()),
            }
        }
        let joined = text.join(" ");
        prop_assert_eq!(extract_urls(&joined), expected);
    }

    #[test]
    fn matches_never_contain_whitespace(text in "\\PC{0,200}") {
        for url in extract_urls(&text) {
            prop_assert!(url.starts_with("http://") || url.starts_with("https://"));
            prop_assert!(!url.chars().any(char::is_whitespace));
            prop_assert!(text.contains(&url));
        }
    }
}
