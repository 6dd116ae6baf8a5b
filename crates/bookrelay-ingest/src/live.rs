// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Saving URLs from messages as they are posted.

use std::sync::Arc;

use bookrelay_core::{BookmarkRequest, BookmarkSink, ChatMessage, extract_urls};
use tracing::{debug, error, info, warn};

/// Forwards every URL in a new message to the sink.
///
/// There is no batching or pacing here: live traffic is a few messages at a
/// time. Failures are logged and otherwise dropped.
#[derive(Clone)]
pub struct LiveIngestor {
    sink: Arc<dyn BookmarkSink>,
}

impl LiveIngestor {
    pub fn new(sink: Arc<dyn BookmarkSink>) -> Self {
        Self { sink }
    }

    /// Saves the URLs in `message`, one at a time. Returns how many were
    /// saved. Messages posted by the bot itself are ignored.
    pub async fn handle(&self, message: &ChatMessage) -> usize {
        if message.from_self {
            return 0;
        }

        let urls = extract_urls(&message.content);
        if urls.is_empty() {
            debug!(message_id = %message.id, "no URL in message");
            return 0;
        }
        info!(message_id = %message.id, author = %message.author, count = urls.len(), "URLs found");

        let mut saved = 0;
        for url in urls {
            let request = BookmarkRequest::new(url).with_excerpt(message.content.clone());
            match self.sink.save(&request).await {
                Ok(true) => saved += 1,
                Ok(false) => warn!(url = %request.url, "bookmark could not be saved"),
                Err(e) => error!(url = %request.url, error = %e, "failed to save bookmark"),
            }
        }
        saved
    }
}
