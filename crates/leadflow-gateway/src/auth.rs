// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication middleware for the gateway.
//!
//! Supports two credentials in `Authorization: Bearer <token>` (checked in order):
//! 1. The static operator token.
//! 2. A signed agent token `<agent_id>.<hex hmac-sha256(secret, agent_id)>`
//!    for an agent that still exists.
//!
//! When neither is configured, all requests are rejected (fail-closed).

use std::fmt;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use leadflow_core::AgentId;

use crate::server::GatewayState;

type HmacSha256 = Hmac<Sha256>;

/// Authentication configuration for the gateway.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Expected operator bearer token. If `Some`, operator auth is enabled.
    pub bearer_token: Option<String>,
    /// Secret for agent token signatures. If `Some`, agent auth is enabled.
    pub token_secret: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// The verified caller of an API request, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerIdentity {
    /// Holder of the static operator token.
    Operator,
    /// An agent authenticated with a signed token.
    Agent(AgentId),
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator => f.write_str("operator"),
            Self::Agent(id) => write!(f, "{id}"),
        }
    }
}

/// Issue the signed bearer token for `agent_id`.
pub fn mint_token(secret: &str, agent_id: &AgentId) -> String {
    let mut mac = hmac_for(secret);
    mac.update(agent_id.as_str().as_bytes());
    format!("{agent_id}.{}", hex::encode(mac.finalize().into_bytes()))
}

/// Check a signed agent token and return the agent it names.
pub fn verify_agent_token(secret: &str, token: &str) -> Option<AgentId> {
    let (agent_id, signature) = token.rsplit_once('.')?;
    if agent_id.is_empty() {
        return None;
    }
    let signature = hex::decode(signature).ok()?;
    let mut mac = hmac_for(secret);
    mac.update(agent_id.as_bytes());
    mac.verify_slice(&signature).ok()?;
    Some(AgentId::from(agent_id))
}

fn hmac_for(secret: &str) -> HmacSha256 {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("hmac accepts keys of any length"),
    }
}

/// Compare two tokens without leaking the position of the first mismatch.
fn tokens_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Middleware that establishes a [`CallerIdentity`] or rejects the request.
pub async fn auth_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth = &state.auth;
    if auth.bearer_token.is_none() && auth.token_secret.is_none() {
        tracing::error!("gateway has no auth configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let Some(token) = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
    else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    // Priority 1: operator token.
    if let Some(expected) = &auth.bearer_token
        && tokens_match(&token, expected)
    {
        request.extensions_mut().insert(CallerIdentity::Operator);
        return Ok(next.run(request).await);
    }

    // Priority 2: signed agent token for an agent that still exists.
    if let Some(secret) = &auth.token_secret
        && let Some(agent_id) = verify_agent_token(secret, &token)
    {
        match state.agents.get_agent(&agent_id).await {
            Ok(Some(_)) => {
                request
                    .extensions_mut()
                    .insert(CallerIdentity::Agent(agent_id));
                return Ok(next.run(request).await);
            }
            Ok(None) => {
                tracing::debug!(agent_id = %agent_id, "token names an unknown agent");
            }
            Err(e) => {
                tracing::error!(error = %e, "agent lookup failed during auth");
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    Err(StatusCode::UNAUTHORIZED)
}
