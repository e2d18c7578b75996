// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use leadflow_core::{
    AgentDirectory, AgentPool, AssignmentStore, LeadStore, LeadflowError, StorageAdapter,
};
use leadflow_distribution::Distributor;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Largest accepted request body (spreadsheet uploads included).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Runs distribution against the stores below.
    pub distributor: Distributor,
    pub leads: Arc<dyn LeadStore>,
    pub agents: Arc<dyn AgentDirectory>,
    pub assignments: Arc<dyn AssignmentStore>,
    /// Backend checked by `/health`.
    pub storage: Arc<dyn StorageAdapter>,
    /// Authentication configuration.
    pub auth: AuthConfig,
}

impl GatewayState {
    /// Build the state from one backend that implements every storage trait.
    pub fn from_storage<S>(storage: Arc<S>, auth: AuthConfig) -> Self
    where
        S: LeadStore + AgentPool + AgentDirectory + AssignmentStore + StorageAdapter,
    {
        Self {
            distributor: Distributor::new(storage.clone(), storage.clone(), storage.clone()),
            leads: storage.clone(),
            agents: storage.clone(),
            assignments: storage.clone(),
            storage,
            auth,
        }
    }
}

/// Gateway server configuration (mirrors `GatewayConfig` from leadflow-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Assemble the full route table.
///
/// `/health` is public; every other route goes through [`auth_middleware`].
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/leads", get(handlers::list_leads).post(handlers::create_lead))
        .route("/leads/{id}", delete(handlers::delete_lead))
        .route("/leads/distribute", post(handlers::distribute))
        .route("/leads/upload", post(handlers::upload_csv))
        .route("/leads/batches/{batch_id}/assign", post(handlers::assign_batch))
        .route(
            "/assignments",
            get(handlers::list_assignments).post(handlers::assign_lead),
        )
        .route("/agents", get(handlers::list_agents).post(handlers::create_agent))
        .route(
            "/agents/{id}",
            get(handlers::get_agent)
                .put(handlers::update_agent)
                .delete(handlers::delete_agent),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), LeadflowError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LeadflowError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| LeadflowError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5001,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn server_stops_on_cancel() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let state = crate::tests_support::state(AuthConfig::default()).await;
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        start_server(&config, state, shutdown).await.unwrap();
    }
}
