// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Leadflow.
//!
//! Exposes lead intake (`/leads/distribute`, `/leads/upload`), batch
//! re-assignment, and the agent/lead/assignment listings over axum. Every
//! route except `/health` requires a bearer credential, see [`auth`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::{AuthConfig, CallerIdentity, mint_token};
pub use error::ApiError;
pub use server::{GatewayState, ServerConfig, build_router, start_server};
