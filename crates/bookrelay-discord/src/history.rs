// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paged access to a channel's message history.
//!
//! Discord returns at most 100 messages per request. [`DiscordHistory`] walks
//! the pages lazily: newest first with `before` cursors, or oldest first with
//! `after` cursors starting at the cutoff.

use std::cmp::Reverse;
use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bookrelay_core::{ChatMessage, HistoryQuery, MessageHistory, RelayError};
use futures::stream::{self, BoxStream, StreamExt};
use serenity::builder::GetMessages;
use serenity::http::Http;
use serenity::model::channel::Channel;
use serenity::model::id::{ChannelId, MessageId, UserId};
use tracing::debug;

use crate::channel_error;
use crate::convert::{time_snowflake, to_chat_message};

/// Largest page the REST API serves.
const PAGE_SIZE: u8 = 100;

/// Where the next page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    /// The most recent messages.
    Latest,
    /// Messages with an id lower than this one.
    Before(u64),
    /// Messages with an id higher than this one.
    After(u64),
}

/// A message with its numeric id, used to move the cursor.
#[derive(Debug, Clone)]
pub struct PagedMessage {
    pub id: u64,
    pub message: ChatMessage,
}

/// One page request against a channel.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Up to `limit` messages next to `cursor`, in any order.
    async fn fetch(&self, cursor: PageCursor, limit: u8) -> Result<Vec<PagedMessage>, RelayError>;
}

/// [`PageSource`] backed by the Discord REST API.
pub struct ChannelPages {
    http: Arc<Http>,
    channel_id: ChannelId,
    bot_id: Option<UserId>,
}

impl ChannelPages {
    /// Logs in with `token` to learn the bot's own user id.
    pub async fn connect(token: &str, channel_id: u64) -> Result<Self, RelayError> {
        if channel_id == 0 {
            return Err(RelayError::Config("discord.channel_id must be set".into()));
        }

        let http = Arc::new(Http::new(token));
        let me = http
            .get_current_user()
            .await
            .map_err(|e| channel_error("failed to log in to Discord", e))?;
        debug!(user = %me.name, "Discord REST session ready");

        Ok(Self {
            http,
            channel_id: ChannelId::new(channel_id),
            bot_id: Some(me.id),
        })
    }

    /// Display name of the channel. Fails if the channel cannot be seen.
    pub async fn channel_name(&self) -> Result<String, RelayError> {
        let channel = self
            .http
            .get_channel(self.channel_id)
            .await
            .map_err(|e| channel_error(&format!("channel {} not found", self.channel_id), e))?;

        Ok(match channel {
            Channel::Guild(channel) => format!("#{}", channel.name),
            other => other.id().to_string(),
        })
    }
}

#[async_trait]
impl PageSource for ChannelPages {
    async fn fetch(&self, cursor: PageCursor, limit: u8) -> Result<Vec<PagedMessage>, RelayError> {
        let builder = GetMessages::new().limit(limit);
        let builder = match cursor {
            PageCursor::Latest => builder,
            PageCursor::Before(id) => builder.before(MessageId::new(id)),
            PageCursor::After(id) => builder.after(MessageId::new(id)),
        };

        let messages = self
            .channel_id
            .messages(self.http.as_ref(), builder)
            .await
            .map_err(|e| channel_error("failed to fetch message history", e))?;
        debug!(?cursor, count = messages.len(), "history page fetched");

        Ok(messages
            .iter()
            .map(|msg| PagedMessage {
                id: msg.id.get(),
                message: to_chat_message(msg, self.bot_id),
            })
            .collect())
    }
}

/// [`MessageHistory`] over any [`PageSource`].
#[derive(Clone)]
pub struct DiscordHistory {
    pages: Arc<dyn PageSource>,
}

impl DiscordHistory {
    pub fn new(pages: Arc<dyn PageSource>) -> Self {
        Self { pages }
    }
}

impl MessageHistory for DiscordHistory {
    fn history(&self, query: HistoryQuery) -> BoxStream<'_, Result<ChatMessage, RelayError>> {
        let paging = Paging::new(query);
        stream::unfold(paging, move |mut paging| async move {
            let item = paging.next(self.pages.as_ref()).await?;
            Some((item, paging))
        })
        .boxed()
    }
}

/// Cursor state for one history walk.
struct Paging {
    query: HistoryQuery,
    cursor: PageCursor,
    buffer: VecDeque<ChatMessage>,
    yielded: usize,
    exhausted: bool,
}

impl Paging {
    fn new(query: HistoryQuery) -> Self {
        let cursor = if query.oldest_first {
            PageCursor::After(query.after.map(time_snowflake).unwrap_or(1))
        } else {
            PageCursor::Latest
        };
        Self {
            query,
            cursor,
            buffer: VecDeque::new(),
            yielded: 0,
            exhausted: false,
        }
    }

    async fn next(&mut self, pages: &dyn PageSource) -> Option<Result<ChatMessage, RelayError>> {
        loop {
            if self.query.limit.is_some_and(|limit| self.yielded >= limit) {
                return None;
            }
            if let Some(message) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(message));
            }
            if self.exhausted {
                return None;
            }

            match pages.fetch(self.cursor, PAGE_SIZE).await {
                Ok(page) => self.absorb(page),
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }

    fn absorb(&mut self, mut page: Vec<PagedMessage>) {
        if page.len() < usize::from(PAGE_SIZE) {
            self.exhausted = true;
        }

        if self.query.oldest_first {
            page.sort_by_key(|p| p.id);
            if let Some(last) = page.last() {
                self.cursor = PageCursor::After(last.id);
            }
        } else {
            page.sort_by_key(|p| Reverse(p.id));
            if let Some(last) = page.last() {
                self.cursor = PageCursor::Before(last.id);
            }
        }

        for paged in page {
            if self
                .query
                .after
                .is_some_and(|after| paged.message.created_at <= after)
            {
                // Newest first, everything past this point is older still.
                if !self.query.oldest_first {
                    self.exhausted = true;
                    break;
                }
                continue;
            }
            self.buffer.push_back(paged.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::snowflake_time;
    use bookrelay_test_utils::chat_message;
    use futures::TryStreamExt;
    use tokio::sync::Mutex;

    /// Message `n` gets a distinct millisecond.
    fn id_of(n: u64) -> u64 {
        (1_000_000 + n) << 22
    }

    /// Serves messages the way the REST API does: newest first, at most
    /// `limit` per page.
    struct FakeChannel {
        ids: Vec<u64>,
        calls: Mutex<Vec<PageCursor>>,
        fail: bool,
    }

    impl FakeChannel {
        fn with_messages(count: u64) -> Self {
            Self {
                ids: (1..=count).map(id_of).collect(),
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl PageSource for FakeChannel {
        async fn fetch(
            &self,
            cursor: PageCursor,
            limit: u8,
        ) -> Result<Vec<PagedMessage>, RelayError> {
            self.calls.lock().await.push(cursor);
            if self.fail {
                return Err(RelayError::Channel {
                    message: "missing access".into(),
                    source: None,
                });
            }

            let limit = usize::from(limit);
            let mut ids: Vec<u64> = match cursor {
                PageCursor::Latest => {
                    let mut ids = self.ids.clone();
                    ids.sort_by_key(|id| Reverse(*id));
                    ids.into_iter().take(limit).collect()
                }
                PageCursor::Before(before) => {
                    let mut ids: Vec<u64> =
                        self.ids.iter().copied().filter(|id| *id < before).collect();
                    ids.sort_by_key(|id| Reverse(*id));
                    ids.into_iter().take(limit).collect()
                }
                PageCursor::After(after) => {
                    let mut ids: Vec<u64> =
                        self.ids.iter().copied().filter(|id| *id > after).collect();
                    ids.sort();
                    ids.into_iter().take(limit).collect()
                }
            };
            ids.sort_by_key(|id| Reverse(*id));

            Ok(ids
                .into_iter()
                .map(|id| PagedMessage {
                    id,
                    message: chat_message(id, "https://a.example", snowflake_time(id)),
                })
                .collect())
        }
    }

    async fn collect_ids(channel: Arc<FakeChannel>, query: HistoryQuery) -> Vec<u64> {
        let history = DiscordHistory::new(channel);
        let messages: Vec<ChatMessage> = history.history(query).try_collect().await.unwrap();
        messages.iter().map(|m| m.id.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn newest_first_walks_every_page() {
        let channel = Arc::new(FakeChannel::with_messages(250));
        let ids = collect_ids(channel.clone(), HistoryQuery::default()).await;

        let expected: Vec<u64> = (1..=250).rev().map(id_of).collect();
        assert_eq!(ids, expected);

        let calls = channel.calls.lock().await;
        assert_eq!(
            *calls,
            [
                PageCursor::Latest,
                PageCursor::Before(id_of(151)),
                PageCursor::Before(id_of(51)),
            ]
        );
    }

    #[tokio::test]
    async fn limit_stops_fetching_early() {
        let channel = Arc::new(FakeChannel::with_messages(250));
        let ids = collect_ids(
            channel.clone(),
            HistoryQuery {
                limit: Some(150),
                ..HistoryQuery::default()
            },
        )
        .await;

        assert_eq!(ids.len(), 150);
        assert_eq!(ids[0], id_of(250));
        assert_eq!(ids[149], id_of(101));
        assert_eq!(channel.calls.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn newest_first_stops_at_cutoff() {
        let channel = Arc::new(FakeChannel::with_messages(250));
        let after = snowflake_time(id_of(200));
        let ids = collect_ids(
            channel.clone(),
            HistoryQuery {
                after: Some(after),
                ..HistoryQuery::default()
            },
        )
        .await;

        let expected: Vec<u64> = (201..=250).rev().map(id_of).collect();
        assert_eq!(ids, expected);
        assert_eq!(channel.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn oldest_first_starts_at_cutoff() {
        let channel = Arc::new(FakeChannel::with_messages(250));
        let after = snowflake_time(id_of(100));
        let ids = collect_ids(
            channel.clone(),
            HistoryQuery {
                after: Some(after),
                oldest_first: true,
                ..HistoryQuery::default()
            },
        )
        .await;

        let expected: Vec<u64> = (101..=250).map(id_of).collect();
        assert_eq!(ids, expected);

        let calls = channel.calls.lock().await;
        assert_eq!(calls[0], PageCursor::After(id_of(100)));
        assert_eq!(calls[1], PageCursor::After(id_of(200)));
    }

    #[tokio::test]
    async fn fetch_error_ends_the_stream() {
        let channel = Arc::new(FakeChannel {
            fail: true,
            ..FakeChannel::with_messages(10)
        });
        let history = DiscordHistory::new(channel.clone());
        let items: Vec<_> = history.history(HistoryQuery::default()).collect().await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(RelayError::Channel { .. })));
        assert_eq!(channel.calls.lock().await.len(), 1);
    }
}
