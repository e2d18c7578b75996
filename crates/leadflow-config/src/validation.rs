// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: a usable bind host, a
//! non-empty database path, a known log level, and a token secret long
//! enough to sign agent tokens.

use crate::diagnostic::ConfigError;
use crate::model::LeadflowConfig;

/// Accepted values for `service.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Minimum length of `gateway.token_secret`.
pub const MIN_TOKEN_SECRET_LEN: usize = 16;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &LeadflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let level = config.service.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` is not one of: {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "gateway.bearer_token must not be blank when set".to_string(),
        });
    }

    if let Some(secret) = &config.gateway.token_secret
        && secret.len() < MIN_TOKEN_SECRET_LEN
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "gateway.token_secret must be at least {MIN_TOKEN_SECRET_LEN} characters, got {}",
                secret.len()
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = LeadflowConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn bad_host_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.gateway.host = "local host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "gateway.host"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.service.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log_level"));
    }

    #[test]
    fn short_token_secret_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.gateway.token_secret = Some("short".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "token_secret"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = LeadflowConfig::default();
        config.gateway.host = String::new();
        config.storage.database_path = String::new();
        config.gateway.bearer_token = Some(" ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = LeadflowConfig::default();
        config.gateway.host = "0.0.0.0".to_string();
        config.gateway.bearer_token = Some("ops-token".to_string());
        config.gateway.token_secret = Some("0123456789abcdef".to_string());
        config.storage.database_path = "/tmp/leads.db".to_string();
        config.service.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
