// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookrelay - bookmarks links posted in a Discord channel to Shiori.
//!
//! This is the binary entry point. `listen` follows the channel live;
//! `import` walks its history once.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod import;
mod listen;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use bookrelay_config::model::RelayConfig;
use bookrelay_config::{ConfigError, render_errors, require_discord, require_shiori};
use bookrelay_core::RelayError;
use clap::{Parser, Subcommand};
use tracing::error;

/// Bookrelay - bookmarks links posted in a Discord channel to Shiori.
#[derive(Parser, Debug)]
#[command(name = "bookrelay", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the channel and bookmark links as they are posted.
    Listen,
    /// Bookmark links already posted in the channel.
    Import(import::ImportArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Values from .env only fill gaps; the real environment wins.
    let _ = dotenvy::dotenv();

    let mut config = match bookrelay_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.log.level.to_ascii_lowercase()
    };
    init_tracing(&level);

    let cancel = shutdown::install_signal_handler();
    let result = match cli.command {
        Commands::Listen => listen::run_listen(config, cancel).await,
        Commands::Import(args) => {
            args.apply(&mut config.import);
            import::run_import(config, cancel).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "bookrelay stopped with an error");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Checks the settings a command cannot run without. Every missing key is
/// reported, not just the first.
fn require_settings(config: &RelayConfig, needs_shiori: bool) -> Result<(), RelayError> {
    let mut missing: Vec<ConfigError> = require_discord(config).err().unwrap_or_default();
    if needs_shiori && let Err(errors) = require_shiori(config) {
        missing.extend(errors);
    }

    if missing.is_empty() {
        return Ok(());
    }
    render_errors(&missing);
    Err(RelayError::Config(format!(
        "{} required setting(s) missing",
        missing.len()
    )))
}

/// `RUST_LOG` wins; otherwise targets starting with `bookrelay` (every
/// workspace crate) log at `level` and everything else at `warn`.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bookrelay={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bookrelay", "listen", "-v", "--config", "relay.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("relay.toml")));
        assert!(matches!(cli.command, Commands::Listen));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["bookrelay"]).is_err());
    }

    #[test]
    fn dry_run_import_needs_no_shiori_credentials() {
        let mut config = RelayConfig::default();
        config.discord.bot_token = Some("token".into());
        config.discord.channel_id = Some(42);

        assert!(require_settings(&config, false).is_ok());
        assert!(matches!(
            require_settings(&config, true),
            Err(RelayError::Config(_))
        ));
    }
}
