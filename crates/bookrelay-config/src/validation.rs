// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! [`validate_config`] checks semantic constraints that hold for every
//! command. The `require_*` functions check presence of the settings a
//! particular command needs.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::RelayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(url) = config.shiori.api_url.as_deref() {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::Validation {
                message: format!("shiori.api_url `{url}` must start with http:// or https://"),
            });
        }
    }

    if config.shiori.auth_max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: "shiori.auth_max_attempts must be at least 1".to_string(),
        });
    }

    if config.shiori.save_max_retries < 1 {
        errors.push(ConfigError::Validation {
            message: "shiori.save_max_retries must be at least 1".to_string(),
        });
    }

    if config.shiori.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "shiori.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.shiori.auth_schemes.is_empty() {
        errors.push(ConfigError::Validation {
            message: "shiori.auth_schemes must list at least one scheme".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for scheme in &config.shiori.auth_schemes {
        if !seen.insert(scheme) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate scheme `{scheme}` in shiori.auth_schemes"),
            });
        }
    }

    if config.import.batch_size < 1 {
        errors.push(ConfigError::Validation {
            message: "import.batch_size must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that everything needed to talk to Shiori is present.
pub fn require_shiori(config: &RelayConfig) -> Result<(), Vec<ConfigError>> {
    let shiori = &config.shiori;
    let errors: Vec<ConfigError> = [
        ("shiori.api_url", shiori.api_url.as_deref()),
        ("shiori.username", shiori.username.as_deref()),
        ("shiori.password", shiori.password.as_deref()),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
    .map(|(key, _)| ConfigError::MissingKey {
        key: key.to_string(),
    })
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that the bot token and monitored channel are present.
pub fn require_discord(config: &RelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config
        .discord
        .bot_token
        .as_deref()
        .is_none_or(|t| t.trim().is_empty())
    {
        errors.push(ConfigError::MissingKey {
            key: "discord.bot_token".to_string(),
        });
    }

    match config.discord.channel_id {
        None => errors.push(ConfigError::MissingKey {
            key: "discord.channel_id".to_string(),
        }),
        Some(0) => errors.push(ConfigError::Validation {
            message: "discord.channel_id must not be 0".to_string(),
        }),
        Some(_) => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
