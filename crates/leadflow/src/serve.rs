// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow serve` command implementation.
//!
//! Opens SQLite storage, wires the distributor and gateway state, and serves
//! the HTTP API until SIGINT or SIGTERM.

use std::sync::Arc;

use leadflow_config::model::LeadflowConfig;
use leadflow_core::{LeadflowError, StorageAdapter};
use leadflow_gateway::{AuthConfig, GatewayState, ServerConfig, start_server};
use leadflow_storage::SqliteStorage;
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `leadflow serve` command.
pub async fn run_serve(config: LeadflowConfig) -> Result<(), LeadflowError> {
    init_tracing(&config.service.log_level);

    info!(
        name = %config.service.name,
        database = %config.storage.database_path,
        "starting leadflow serve"
    );

    let storage = Arc::new(SqliteStorage::open(config.storage.clone()).await?);

    let auth = AuthConfig {
        bearer_token: config.gateway.bearer_token.clone(),
        token_secret: config.gateway.token_secret.clone(),
    };
    if auth.bearer_token.is_none() && auth.token_secret.is_none() {
        warn!("no gateway credentials configured; every API route will answer 401");
    }

    let state = GatewayState::from_storage(storage.clone(), auth);
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&server_config, state, cancel).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }
    served?;

    info!("leadflow serve shutdown complete");
    Ok(())
}

/// Log targets that follow the configured level; everything else logs at `warn`.
const LOG_TARGETS: &[&str] = &[
    "leadflow",
    "leadflow_distribution",
    "leadflow_gateway",
    "leadflow_storage",
    "tower_http",
];

fn default_filter(log_level: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
