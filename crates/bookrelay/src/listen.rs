// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bookrelay listen` command implementation.

use std::sync::Arc;

use bookrelay_config::model::RelayConfig;
use bookrelay_core::RelayError;
use bookrelay_discord::DiscordListener;
use bookrelay_ingest::LiveIngestor;
use bookrelay_shiori::BookmarkClient;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::require_settings;

/// Runs the live listener until a shutdown signal or a gateway failure.
///
/// The Shiori session is opened lazily on the first save.
pub async fn run_listen(config: RelayConfig, cancel: CancellationToken) -> Result<(), RelayError> {
    require_settings(&config, true)?;

    let client = BookmarkClient::from_config(&config.shiori)?;
    let ingestor = LiveIngestor::new(Arc::new(client));

    let listener = DiscordListener::new(
        config.discord.bot_token.unwrap_or_default(),
        config.discord.channel_id.unwrap_or_default(),
        ingestor,
    )?;

    info!("starting bookrelay listener");
    listener.run(cancel).await?;
    info!("listener stopped");
    Ok(())
}
