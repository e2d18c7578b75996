// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Leadflow configuration.
///
/// Every section is optional and defaults to values that run a local
/// instance against a SQLite file in the user's data directory.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadflowConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP API settings, including the identity gate.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs and the health endpoint.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "leadflow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Static operator bearer token. `None` disables operator access.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// HMAC secret used to verify signed agent tokens. `None` disables agent tokens.
    #[serde(default)]
    pub token_secret: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            token_secret: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("leadflow").join("leadflow.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("leadflow.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_local_and_locked_down() {
        let config = LeadflowConfig::default();
        assert_eq!(config.service.name, "leadflow");
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 5001);
        assert!(config.gateway.bearer_token.is_none());
        assert!(config.gateway.token_secret.is_none());
        assert!(config.storage.wal_mode);
        assert!(config.storage.database_path.ends_with("leadflow.db"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: LeadflowConfig = toml::from_str(
            r#"
[gateway]
port = 8080
"#,
        )
        .unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = toml::from_str::<LeadflowConfig>(
            r#"
[storage]
database_pth = "/tmp/x.db"
"#,
        );
        assert!(result.is_err());
    }
}
