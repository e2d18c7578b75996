// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./leadflow.toml` > `~/.config/leadflow/leadflow.toml` >
//! `/etc/leadflow/leadflow.toml`, with `LEADFLOW_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LeadflowConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/leadflow/leadflow.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "leadflow.toml";

/// The user config file under the XDG config directory, if one can be resolved.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("leadflow").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadflow/leadflow.toml`
/// 3. `~/.config/leadflow/leadflow.toml`
/// 4. `./leadflow.toml`
/// 5. `LEADFLOW_*` environment variables
pub fn load_config() -> Result<LeadflowConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LeadflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user_path) = user_config_path() {
        figment = figment.merge(Toml::file(user_path));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `LEADFLOW_<SECTION>_<KEY>` to `section.key`.
///
/// Figment strips the prefix but keeps the case, so the key is lowercased
/// before the section separator is placed. Only the first underscore after
/// the section name is a separator: `LEADFLOW_GATEWAY_BEARER_TOKEN` maps to
/// `gateway.bearer_token`.
fn env_provider() -> Env {
    Env::prefixed("LEADFLOW_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
