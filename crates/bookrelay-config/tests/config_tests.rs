// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Bookrelay configuration system.

use std::path::Path;

use bookrelay_config::diagnostic::ConfigError;
use bookrelay_config::model::RelayConfig;
use bookrelay_config::{load_and_validate_str, load_config_from_path, load_config_from_str};
use bookrelay_core::AuthScheme;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_relay_config() {
    let toml = r#"
[log]
level = "debug"

[discord]
bot_token = "discord-token"
channel_id = 123456789012345678

[shiori]
api_url = "http://shiori.local:8080/api/v1"
username = "shiori"
password = "gopher"
session_ttl_secs = 600
auth_max_attempts = 5
auth_retry_delay_ms = 100
save_max_retries = 4
save_retry_delay_ms = 250
request_timeout_secs = 10
auth_schemes = ["bearer", "session-header"]

[import]
days = 30
limit = 500
batch_size = 5
request_delay_ms = 200
batch_delay_ms = 2000
reverse_order = false
dry_run = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.discord.bot_token.as_deref(), Some("discord-token"));
    assert_eq!(config.discord.channel_id, Some(123456789012345678));
    assert_eq!(
        config.shiori.api_url.as_deref(),
        Some("http://shiori.local:8080/api/v1")
    );
    assert_eq!(config.shiori.session_ttl_secs, 600);
    assert_eq!(config.shiori.auth_max_attempts, 5);
    assert_eq!(config.shiori.save_max_retries, 4);
    assert_eq!(
        config.shiori.auth_schemes,
        vec![AuthScheme::Bearer, AuthScheme::SessionHeader]
    );
    assert_eq!(config.import.days, Some(30));
    assert_eq!(config.import.limit, Some(500));
    assert_eq!(config.import.batch_size, 5);
    assert!(!config.import.reverse_order);
    assert!(config.import.dry_run);
}

/// Sections left out fall back to their defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("[log]\nlevel = \"warn\"\n").unwrap();
    assert_eq!(config.log.level, "warn");
    assert_eq!(config.import.batch_size, 10);
    assert_eq!(config.import.request_delay_ms, 500);
    assert_eq!(config.import.batch_delay_ms, 5000);
    assert!(config.import.reverse_order);
    assert!(!config.import.dry_run);
    assert_eq!(config.shiori.auth_schemes, AuthScheme::ALL.to_vec());
}

#[test]
fn serialized_defaults_are_sensible() {
    let config = RelayConfig::default();
    assert_eq!(config.log.level, "info");
    assert!(config.discord.bot_token.is_none());
    assert!(config.shiori.api_url.is_none());
    assert_eq!(config.shiori.session_ttl_secs, 3600);
    assert_eq!(config.shiori.auth_max_attempts, 3);
    assert_eq!(config.shiori.save_max_retries, 3);
    assert!(config.import.days.is_none());
    assert!(config.import.limit.is_none());
}

#[test]
fn unknown_field_in_import_produces_error() {
    let err = load_config_from_str("[import]\nbatch_sise = 3\n").expect_err("should reject");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("batch_sise"),
        "got: {err_str}"
    );
}

#[test]
fn unknown_top_level_section_produces_error() {
    assert!(load_config_from_str("[telegram]\nbot_token = \"x\"\n").is_err());
}

#[test]
fn unknown_auth_scheme_is_rejected() {
    assert!(load_config_from_str("[shiori]\nauth_schemes = [\"cookie\"]\n").is_err());
}

#[test]
fn diagnostic_error_suggests_close_key() {
    let errors = load_and_validate_str("[shiori]\nusernme = \"x\"\n").expect_err("should fail");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "usernme"
                && suggestion.as_deref() == Some("username")
                && valid_keys.contains("api_url")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

#[test]
fn diagnostic_invalid_type_message() {
    let err = load_config_from_str("[import]\nbatch_size = \"ten\"\n").expect_err("should fail");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("batch_size"),
        "got: {err_str}"
    );
}

#[test]
fn load_and_validate_runs_semantic_checks() {
    let errors = load_and_validate_str("[import]\nbatch_size = 0\n").expect_err("should fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("batch_size"))));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::MissingKey {
        key: "shiori.password".to_string(),
    };
    assert_eq!(
        error.code().map(|c| c.to_string()).as_deref(),
        Some("bookrelay::config::missing_key")
    );

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("shiori.password"), "got: {buf}");
    assert!(buf.contains("BOOKRELAY_SHIORI_PASSWORD"), "got: {buf}");
}

/// Legacy bare variables fill in values missing from the file, and
/// `BOOKRELAY_` variables win over both.
#[test]
fn environment_precedence() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "bookrelay.toml",
            r#"
[shiori]
api_url = "http://from-file/api/v1"
username = "file-user"

[import]
batch_size = 7
"#,
        )?;
        jail.set_env("SHIORI_API_URL", "http://from-legacy/api/v1");
        jail.set_env("SHIORI_PASSWORD", "legacy-pass");
        jail.set_env("DISCORD_CHANNEL_ID", "42");
        jail.set_env("BOOKRELAY_SHIORI_API_URL", "http://from-prefixed/api/v1");
        jail.set_env("BOOKRELAY_IMPORT_BATCH_SIZE", "3");
        jail.set_env("BOOKRELAY_IMPORT_DRY_RUN", "true");

        let config = load_config_from_path(Path::new("bookrelay.toml"))?;

        assert_eq!(
            config.shiori.api_url.as_deref(),
            Some("http://from-prefixed/api/v1")
        );
        assert_eq!(config.shiori.username.as_deref(), Some("file-user"));
        assert_eq!(config.shiori.password.as_deref(), Some("legacy-pass"));
        assert_eq!(config.discord.channel_id, Some(42));
        assert_eq!(config.import.batch_size, 3);
        assert!(config.import.dry_run);
        Ok(())
    });
}

#[test]
fn legacy_discord_token_maps_to_bot_token() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("bookrelay.toml", "")?;
        jail.set_env("DISCORD_TOKEN", "legacy-bot-token");

        let config = load_config_from_path(Path::new("bookrelay.toml"))?;
        assert_eq!(config.discord.bot_token.as_deref(), Some("legacy-bot-token"));
        Ok(())
    });
}
