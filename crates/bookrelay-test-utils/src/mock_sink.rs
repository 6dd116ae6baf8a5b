// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock bookmark sink for deterministic testing.
//!
//! `MockSink` implements `BookmarkSink`, recording every request together
//! with the (tokio) instant it arrived so pacing can be asserted under paused
//! time.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use bookrelay_core::{BookmarkRequest, BookmarkSink, RelayError};

/// One scripted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedSave {
    Saved,
    Failed,
    /// Answer with an authentication error, as if login were exhausted.
    AuthError,
}

/// A sink that answers from a FIFO script.
///
/// When the script is empty every save succeeds.
#[derive(Clone, Default)]
pub struct MockSink {
    script: Arc<Mutex<VecDeque<ScriptedSave>>>,
    received: Arc<Mutex<Vec<(BookmarkRequest, Instant)>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink pre-loaded with the given answers.
    pub fn with_script(script: Vec<ScriptedSave>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            ..Self::default()
        }
    }

    /// Every request seen so far, in arrival order.
    pub async fn requests(&self) -> Vec<BookmarkRequest> {
        self.received
            .lock()
            .await
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    /// URLs of every request seen so far, in arrival order.
    pub async fn urls(&self) -> Vec<String> {
        self.received
            .lock()
            .await
            .iter()
            .map(|(request, _)| request.url.clone())
            .collect()
    }

    /// Arrival instants of every request.
    pub async fn arrivals(&self) -> Vec<Instant> {
        self.received.lock().await.iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl BookmarkSink for MockSink {
    async fn save(&self, request: &BookmarkRequest) -> Result<bool, RelayError> {
        self.received
            .lock()
            .await
            .push((request.clone(), Instant::now()));

        let next = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or(ScriptedSave::Saved);

        match next {
            ScriptedSave::Saved => Ok(true),
            ScriptedSave::Failed => Ok(false),
            ScriptedSave::AuthError => Err(RelayError::Auth {
                message: "scripted login failure".into(),
                status: Some(401),
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn follows_script_then_succeeds() {
        let sink = MockSink::with_script(vec![ScriptedSave::Failed, ScriptedSave::AuthError]);
        let req = BookmarkRequest::new("https://a.com");

        assert!(!sink.save(&req).await.unwrap());
        assert!(sink.save(&req).await.unwrap_err().is_auth());
        assert!(sink.save(&req).await.unwrap());
        assert_eq!(sink.urls().await.len(), 3);
    }
}
