// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent enumeration and management.

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::types::{Agent, AgentId, AgentUpdate, NewAgent};

/// Read-only view of the agents eligible for a distribution run.
#[async_trait]
pub trait AgentPool: Send + Sync {
    /// All agents in creation order. The order must be stable for unchanged
    /// stored state so repeated runs produce repeatable pairings.
    async fn snapshot(&self) -> Result<Vec<Agent>, LeadflowError>;
}

/// Agent CRUD used by the API and CLI.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Register an agent. Fails with [`LeadflowError::Conflict`] on a duplicate email.
    async fn create_agent(&self, agent: &NewAgent) -> Result<Agent, LeadflowError>;

    /// All agents, newest first.
    async fn list_agents(&self) -> Result<Vec<Agent>, LeadflowError>;

    async fn get_agent(&self, id: &AgentId) -> Result<Option<Agent>, LeadflowError>;

    /// Apply a partial update. Fails with [`LeadflowError::NotFound`] for unknown ids.
    async fn update_agent(&self, id: &AgentId, update: &AgentUpdate)
        -> Result<Agent, LeadflowError>;

    /// Delete an agent. Returns `false` if the agent did not exist.
    async fn delete_agent(&self, id: &AgentId) -> Result<bool, LeadflowError>;
}
