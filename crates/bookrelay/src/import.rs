// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bookrelay import` command implementation.
//!
//! Reads the channel history once and saves every link found, in paced
//! batches. Flags override the `[import]` section of the configuration.

use std::sync::Arc;

use bookrelay_config::model::{ImportConfig, RelayConfig};
use bookrelay_core::RelayError;
use bookrelay_discord::{ChannelPages, DiscordHistory};
use bookrelay_ingest::{BacklogImporter, ImportReport, ImportSettings};
use bookrelay_shiori::BookmarkClient;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::require_settings;

/// Options for `bookrelay import`.
#[derive(Args, Debug, Default)]
pub struct ImportArgs {
    /// Only import messages from the last N days.
    #[arg(short, long, value_name = "N")]
    pub days: Option<u32>,

    /// Maximum number of messages to read.
    #[arg(short, long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// URLs per batch.
    #[arg(short, long, value_name = "SIZE", value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: Option<u64>,

    /// Seconds to wait after every save.
    #[arg(short = 'r', long, value_name = "SECONDS", value_parser = parse_seconds)]
    pub request_delay: Option<u64>,

    /// Seconds to wait between batches.
    #[arg(long, value_name = "SECONDS", value_parser = parse_seconds)]
    pub batch_delay: Option<u64>,

    /// Process the oldest messages first.
    #[arg(long, overrides_with = "as_received")]
    pub reverse: bool,

    /// Process messages newest first, in the order Discord returns them.
    #[arg(long, overrides_with = "reverse")]
    pub as_received: bool,

    /// Log what would be imported without saving anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    /// Writes the given flags over the configured import settings.
    pub fn apply(&self, import: &mut ImportConfig) {
        if let Some(days) = self.days {
            import.days = Some(days);
        }
        if let Some(limit) = self.limit {
            import.limit = Some(limit);
        }
        if let Some(size) = self.batch_size {
            import.batch_size = usize::try_from(size).unwrap_or(usize::MAX);
        }
        if let Some(ms) = self.request_delay {
            import.request_delay_ms = ms;
        }
        if let Some(ms) = self.batch_delay {
            import.batch_delay_ms = ms;
        }
        if self.reverse {
            import.reverse_order = true;
        } else if self.as_received {
            import.reverse_order = false;
        }
        if self.dry_run {
            import.dry_run = true;
        }
    }
}

/// Parses a non-negative number of seconds (fractions allowed) into
/// milliseconds.
fn parse_seconds(value: &str) -> Result<u64, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number of seconds"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("`{value}` must be zero or more seconds"));
    }
    Ok((secs * 1000.0).round() as u64)
}

/// Runs the backlog import.
///
/// Outside dry-run mode the Shiori credentials are checked before any
/// history is read, so a bad password fails fast.
pub async fn run_import(config: RelayConfig, cancel: CancellationToken) -> Result<(), RelayError> {
    let settings = ImportSettings::from(&config.import);
    require_settings(&config, !settings.dry_run)?;

    let client = if settings.dry_run {
        info!("dry run: nothing will be sent to Shiori");
        None
    } else {
        let client = BookmarkClient::from_config(&config.shiori)?;
        if let Err(e) = client.session().authenticate(false).await {
            error!(
                error = %e,
                "cannot authenticate with Shiori; check the credentials, or run with --dry-run to inspect the backlog without saving"
            );
            return Err(e);
        }
        Some(Arc::new(client))
    };

    let pages = ChannelPages::connect(
        config.discord.bot_token.as_deref().unwrap_or_default(),
        config.discord.channel_id.unwrap_or_default(),
    )
    .await?;
    let channel = pages.channel_name().await?;
    info!(
        channel = %channel,
        days = ?settings.days,
        limit = ?settings.limit,
        batch_size = settings.batch_size,
        reverse_order = settings.reverse_order,
        "reading channel history"
    );

    let history = Arc::new(DiscordHistory::new(Arc::new(pages)));
    let mut importer = BacklogImporter::new(history, settings);
    if let Some(client) = client {
        importer = importer.with_sink(client);
    }

    let report = importer.run(&cancel).await?;
    log_summary(&report, importer.settings().dry_run);
    Ok(())
}

fn log_summary(report: &ImportReport, dry_run: bool) {
    if report.interrupted {
        warn!(
            processed = report.processed_messages,
            urls = report.urls_found,
            succeeded = report.succeeded,
            failed = report.failed,
            "import interrupted"
        );
    } else if dry_run {
        info!(
            processed = report.processed_messages,
            urls = report.urls_found,
            "dry run complete"
        );
    } else {
        info!(
            processed = report.processed_messages,
            urls = report.urls_found,
            succeeded = report.succeeded,
            failed = report.failed,
            "import complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        args: ImportArgs,
    }

    fn parse(args: &[&str]) -> ImportArgs {
        let argv = std::iter::once("import").chain(args.iter().copied());
        Harness::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn flags_override_configuration() {
        let args = parse(&["-d", "7", "-l", "500", "-b", "5", "-r", "0.25", "--batch-delay", "2", "--as-received", "--dry-run"]);
        let mut import = ImportConfig::default();
        args.apply(&mut import);

        assert_eq!(import.days, Some(7));
        assert_eq!(import.limit, Some(500));
        assert_eq!(import.batch_size, 5);
        assert_eq!(import.request_delay_ms, 250);
        assert_eq!(import.batch_delay_ms, 2000);
        assert!(!import.reverse_order);
        assert!(import.dry_run);
    }

    #[test]
    fn no_flags_keep_configuration() {
        let mut import = ImportConfig {
            batch_size: 3,
            reverse_order: false,
            ..ImportConfig::default()
        };
        parse(&[]).apply(&mut import);

        assert_eq!(import.batch_size, 3);
        assert!(!import.reverse_order);
        assert!(!import.dry_run);
        assert_eq!(import.request_delay_ms, 500);
    }

    #[test]
    fn last_order_flag_wins() {
        let mut import = ImportConfig::default();
        parse(&["--as-received", "--reverse"]).apply(&mut import);
        assert!(import.reverse_order);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let argv = ["import", "--batch-size", "0"];
        assert!(Harness::try_parse_from(argv).is_err());
    }

    #[test]
    fn seconds_parsing() {
        assert_eq!(parse_seconds("0.5"), Ok(500));
        assert_eq!(parse_seconds("5"), Ok(5000));
        assert_eq!(parse_seconds("0"), Ok(0));
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
        assert!(parse_seconds("inf").is_err());
    }
}
