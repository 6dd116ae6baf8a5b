// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion from Discord messages to [`ChatMessage`].
//!
//! Creation times are read from the message snowflake rather than the
//! serialized timestamp.

use bookrelay_core::ChatMessage;
use chrono::{DateTime, Utc};
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, UserId};

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Creation time encoded in a snowflake.
pub fn snowflake_time(id: u64) -> DateTime<Utc> {
    let ms = (id >> 22) as i64 + DISCORD_EPOCH_MS;
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Smallest snowflake created at or after `at`. Never zero.
pub fn time_snowflake(at: DateTime<Utc>) -> u64 {
    let ms = at.timestamp_millis() - DISCORD_EPOCH_MS;
    if ms <= 0 { 1 } else { (ms as u64) << 22 }
}

/// Whether a message should reach the ingestor: it must be posted in the
/// monitored channel by someone other than the bot.
pub fn should_ingest(
    channel_id: ChannelId,
    author_id: UserId,
    monitored: ChannelId,
    bot_id: Option<UserId>,
) -> bool {
    channel_id == monitored && bot_id != Some(author_id)
}

pub fn to_chat_message(msg: &Message, bot_id: Option<UserId>) -> ChatMessage {
    ChatMessage {
        id: msg.id.to_string(),
        author: msg.author.name.clone(),
        from_self: bot_id == Some(msg.author.id),
        content: msg.content.clone(),
        created_at: snowflake_time(msg.id.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snowflake_time_matches_known_id() {
        // 175928847299117063 was created at 2016-04-30 11:18:25.796 UTC.
        let at = snowflake_time(175_928_847_299_117_063);
        assert_eq!(at, Utc.timestamp_millis_opt(1_462_015_105_796).unwrap());
    }

    #[test]
    fn time_snowflake_round_trips_to_the_millisecond() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(snowflake_time(time_snowflake(at)), at);
    }

    #[test]
    fn time_before_discord_epoch_gives_smallest_id() {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(time_snowflake(at), 1);
    }

    #[test]
    fn only_other_users_in_monitored_channel_are_ingested() {
        let monitored = ChannelId::new(42);
        let bot = UserId::new(7);
        let user = UserId::new(8);

        assert!(should_ingest(monitored, user, monitored, Some(bot)));
        assert!(!should_ingest(monitored, bot, monitored, Some(bot)));
        assert!(!should_ingest(ChannelId::new(43), user, monitored, Some(bot)));
        // Before the ready event the bot's id is unknown.
        assert!(should_ingest(monitored, user, monitored, None));
    }
}
