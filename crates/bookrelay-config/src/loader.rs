// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./bookrelay.toml` > `~/.config/bookrelay/bookrelay.toml`
//! > `/etc/bookrelay/bookrelay.toml`, the legacy bare variables
//! (`SHIORI_API_URL`, `DISCORD_TOKEN`, ...) and `BOOKRELAY_` prefixed overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RelayConfig;

/// Environment variables understood without the `BOOKRELAY_` prefix.
pub const LEGACY_ENV_VARS: &[&str] = &[
    "SHIORI_API_URL",
    "SHIORI_USERNAME",
    "SHIORI_PASSWORD",
    "DISCORD_TOKEN",
    "DISCORD_CHANNEL_ID",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bookrelay/bookrelay.toml` (system-wide)
/// 3. `~/.config/bookrelay/bookrelay.toml` (user XDG config)
/// 4. `./bookrelay.toml` (local directory)
/// 5. Legacy bare environment variables
/// 6. `BOOKRELAY_*` environment variables
pub fn load_config() -> Result<RelayConfig, figment::Error> {
    build_figment(None).extract()
}

/// Load configuration from a TOML string only (no files, no environment).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RelayConfig, figment::Error> {
    build_figment(Some(path)).extract()
}

/// Build the Figment used internally for config loading.
///
/// With `explicit_path`, that file replaces the XDG hierarchy.
pub fn build_figment(explicit_path: Option<&Path>) -> Figment {
    let figment = Figment::new().merge(Serialized::defaults(RelayConfig::default()));

    let figment = match explicit_path {
        Some(path) => figment.merge(Toml::file(path)),
        None => figment
            .merge(Toml::file("/etc/bookrelay/bookrelay.toml"))
            .merge(Toml::file(
                dirs::config_dir()
                    .map(|d| d.join("bookrelay/bookrelay.toml"))
                    .unwrap_or_default(),
            ))
            .merge(Toml::file("bookrelay.toml")),
    };

    figment.merge(legacy_env_provider()).merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `BOOKRELAY_SHIORI_API_URL` must map to `shiori.api_url`, not
/// `shiori.api.url`.
fn env_provider() -> Env {
    Env::prefixed("BOOKRELAY_").map(|key| {
        // `key` has the prefix stripped, e.g. "shiori_api_url".
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = ["log", "discord", "shiori", "import"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or(key_str);
        mapped.into()
    })
}

/// Bare variable names used by earlier `.env` files.
fn legacy_env_provider() -> Env {
    Env::raw().only(LEGACY_ENV_VARS).map(|key| {
        let mapped = match key.as_str().to_ascii_uppercase().as_str() {
            "SHIORI_API_URL" => "shiori.api_url".to_string(),
            "SHIORI_USERNAME" => "shiori.username".to_string(),
            "SHIORI_PASSWORD" => "shiori.password".to_string(),
            "DISCORD_TOKEN" => "discord.bot_token".to_string(),
            "DISCORD_CHANNEL_ID" => "discord.channel_id".to_string(),
            other => other.to_ascii_lowercase(),
        };
        mapped.into()
    })
}
