// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway listener for the monitored channel.

use std::sync::Arc;

use bookrelay_core::RelayError;
use bookrelay_ingest::LiveIngestor;
use secrecy::{ExposeSecret, SecretString};
use serenity::async_trait;
use serenity::model::channel::{Channel, Message};
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, UserId};
use serenity::prelude::*;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::channel_error;
use crate::convert::{should_ingest, to_chat_message};

/// Listens to one channel and forwards new messages to a [`LiveIngestor`].
pub struct DiscordListener {
    token: SecretString,
    channel_id: ChannelId,
    ingestor: LiveIngestor,
}

impl DiscordListener {
    pub fn new(
        token: impl Into<String>,
        channel_id: u64,
        ingestor: LiveIngestor,
    ) -> Result<Self, RelayError> {
        let token: String = token.into();
        if token.trim().is_empty() {
            return Err(RelayError::Config("discord.bot_token cannot be empty".into()));
        }
        if channel_id == 0 {
            return Err(RelayError::Config("discord.channel_id must be set".into()));
        }

        Ok(Self {
            token: SecretString::from(token),
            channel_id: ChannelId::new(channel_id),
            ingestor,
        })
    }

    /// Connects to the gateway and processes messages until `cancel` fires
    /// or the connection fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), RelayError> {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let handler = Handler {
            monitored: self.channel_id,
            ingestor: self.ingestor,
            in_flight: AsyncMutex::new(()),
        };

        let mut client = Client::builder(self.token.expose_secret(), intents)
            .event_handler(handler)
            .await
            .map_err(|e| channel_error("failed to create Discord client", e))?;

        let shard_manager = Arc::clone(&client.shard_manager);
        let shutdown = tokio::spawn(async move {
            cancel.cancelled().await;
            info!("shutting down Discord connection");
            shard_manager.shutdown_all().await;
        });

        info!(channel_id = %self.channel_id, "connecting to Discord");
        let result = client.start().await;
        shutdown.abort();

        result.map_err(|e| channel_error("Discord connection failed", e))
    }
}

struct Handler {
    monitored: ChannelId,
    ingestor: LiveIngestor,
    /// Serenity runs each event on its own task; saves still go one at a time.
    in_flight: AsyncMutex<()>,
}

impl Handler {
    fn accepts(&self, channel_id: ChannelId, author_id: UserId, bot_id: UserId) -> bool {
        should_ingest(channel_id, author_id, self.monitored, Some(bot_id))
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "connected to Discord");

        match self.monitored.to_channel(&ctx).await {
            Ok(Channel::Guild(channel)) => {
                info!(channel = %channel.name, guild_id = %channel.guild_id, "monitoring channel");
            }
            Ok(_) => warn!(channel_id = %self.monitored, "monitored channel is not a server channel"),
            Err(e) => error!(channel_id = %self.monitored, error = %e, "monitored channel not found"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // The cache holds the ready payload before any message is dispatched.
        let bot_id = ctx.cache.current_user().id;
        if !self.accepts(msg.channel_id, msg.author.id, bot_id) {
            return;
        }

        debug!(message_id = %msg.id, author = %msg.author.name, "message in monitored channel");
        let message = to_chat_message(&msg, Some(bot_id));

        let _guard = self.in_flight.lock().await;
        let saved = self.ingestor.handle(&message).await;
        if saved > 0 {
            info!(message_id = %msg.id, saved, "bookmarks saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookrelay_test_utils::MockSink;

    fn ingestor() -> LiveIngestor {
        LiveIngestor::new(Arc::new(MockSink::new()))
    }

    #[test]
    fn rejects_missing_channel() {
        let err = DiscordListener::new("token", 0, ingestor()).err().unwrap();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn rejects_blank_token() {
        let err = DiscordListener::new("  ", 42, ingestor()).err().unwrap();
        assert!(err.to_string().contains("bot_token"));
    }

    #[test]
    fn own_messages_are_ignored() {
        let handler = Handler {
            monitored: ChannelId::new(42),
            ingestor: ingestor(),
            in_flight: AsyncMutex::new(()),
        };
        let bot = UserId::new(7);
        let monitored = ChannelId::new(42);

        assert!(!handler.accepts(monitored, bot, bot));
        assert!(handler.accepts(monitored, UserId::new(8), bot));
        assert!(!handler.accepts(ChannelId::new(43), UserId::new(8), bot));
    }
}
