// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Bookrelay.
//!
//! TOML configuration with strict validation (`deny_unknown_fields`), XDG file
//! hierarchy lookup, environment variable overrides, and miette diagnostics
//! with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use bookrelay_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("batch size: {}", config.import.batch_size);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::RelayConfig;
pub use validation::{require_discord, require_shiori, validate_config};

/// Load configuration and validate it.
///
/// With `path`, that file is used instead of the XDG hierarchy. Environment
/// overrides apply either way. Figment errors are converted to diagnostics
/// with source spans; semantic errors come from [`validate_config`].
pub fn load_and_validate(path: Option<&Path>) -> Result<RelayConfig, Vec<ConfigError>> {
    let loaded = match path {
        Some(p) => loader::load_config_from_path(p),
        None => loader::load_config(),
    };

    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources(path);
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<RelayConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let candidates = match explicit {
        Some(p) => vec![p.to_path_buf()],
        None => {
            let mut paths = vec![std::path::PathBuf::from("/etc/bookrelay/bookrelay.toml")];
            if let Some(dir) = dirs::config_dir() {
                paths.push(dir.join("bookrelay/bookrelay.toml"));
            }
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd.join("bookrelay.toml"));
            }
            paths
        }
    };

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
