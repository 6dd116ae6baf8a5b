// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Bookrelay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use bookrelay_core::AuthScheme;
use serde::{Deserialize, Serialize};

/// Top-level Bookrelay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Discord bot and monitored channel.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Shiori bookmarking service settings.
    #[serde(default)]
    pub shiori: ShioriConfig,

    /// Backlog import defaults. Command-line flags override these.
    #[serde(default)]
    pub import: ImportConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Discord integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Discord bot token. Required by both `listen` and `import`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Identifier of the channel whose links are bookmarked.
    #[serde(default)]
    pub channel_id: Option<u64>,
}

/// Shiori API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShioriConfig {
    /// API base URL, e.g. `http://shiori.local:8080/api/v1`.
    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// How long a session token is trusted locally before re-login.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Login attempts before giving up.
    #[serde(default = "default_auth_max_attempts")]
    pub auth_max_attempts: u32,

    /// Pause between failed login attempts.
    #[serde(default = "default_auth_retry_delay_ms")]
    pub auth_retry_delay_ms: u64,

    /// Save attempts per bookmark before counting it as failed.
    #[serde(default = "default_save_max_retries")]
    pub save_max_retries: u32,

    /// Pause after a transient save failure.
    #[serde(default = "default_save_retry_delay_ms")]
    pub save_retry_delay_ms: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Token presentation schemes, in fallback order.
    #[serde(default = "default_auth_schemes")]
    pub auth_schemes: Vec<AuthScheme>,
}

impl Default for ShioriConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            username: None,
            password: None,
            session_ttl_secs: default_session_ttl_secs(),
            auth_max_attempts: default_auth_max_attempts(),
            auth_retry_delay_ms: default_auth_retry_delay_ms(),
            save_max_retries: default_save_max_retries(),
            save_retry_delay_ms: default_save_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            auth_schemes: default_auth_schemes(),
        }
    }
}

impl ShioriConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn auth_retry_delay(&self) -> Duration {
        Duration::from_millis(self.auth_retry_delay_ms)
    }

    pub fn save_retry_delay(&self) -> Duration {
        Duration::from_millis(self.save_retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_auth_max_attempts() -> u32 {
    3
}

fn default_auth_retry_delay_ms() -> u64 {
    2000
}

fn default_save_max_retries() -> u32 {
    3
}

fn default_save_retry_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_auth_schemes() -> Vec<AuthScheme> {
    AuthScheme::ALL.to_vec()
}

/// Backlog import configuration.
///
/// Small batches and generous pauses: Shiori commonly sits on SQLite, which
/// locks up under bursts of archive-creating writes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Only import messages from the last N days. `None` means no age limit.
    #[serde(default)]
    pub days: Option<u32>,

    /// Maximum number of messages to read. `None` means the whole channel.
    #[serde(default)]
    pub limit: Option<usize>,

    /// URLs per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause after every save.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Pause between batches.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Deliver oldest messages first.
    #[serde(default = "default_reverse_order")]
    pub reverse_order: bool,

    /// Log what would be imported without saving anything.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            days: None,
            limit: None,
            batch_size: default_batch_size(),
            request_delay_ms: default_request_delay_ms(),
            batch_delay_ms: default_batch_delay_ms(),
            reverse_order: default_reverse_order(),
            dry_run: false,
        }
    }
}

fn default_batch_size() -> usize {
    10
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_batch_delay_ms() -> u64 {
    5000
}

fn default_reverse_order() -> bool {
    true
}
