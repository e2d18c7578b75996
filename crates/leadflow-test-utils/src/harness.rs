// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` opens a temp SQLite database, seeds agents, and wires a
//! [`Distributor`] over it so tests can drive whole distribution runs and
//! then inspect what was stored.

use std::sync::Arc;

use leadflow_config::model::StorageConfig;
use leadflow_core::types::{Agent, DistributionSummary};
use leadflow_core::{
    AgentDirectory, AgentId, AssignmentStore, LeadId, LeadflowError, RawRow, StorageAdapter,
};
use leadflow_distribution::Distributor;
use leadflow_gateway::{AuthConfig, GatewayState};
use leadflow_storage::SqliteStorage;

use crate::fixtures;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    agents: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self { agents: Vec::new() }
    }

    /// Register agents, in this order, before the harness is returned.
    pub fn with_agents(mut self, names: &[&str]) -> Self {
        self.agents.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, LeadflowError> {
        let temp_dir = tempfile::TempDir::new().map_err(LeadflowError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        let storage = Arc::new(SqliteStorage::new(storage_config));
        storage.initialize().await?;

        let mut agents = Vec::with_capacity(self.agents.len());
        for name in &self.agents {
            agents.push(storage.create_agent(&fixtures::new_agent(name)).await?);
        }

        let distributor = Distributor::new(storage.clone(), storage.clone(), storage.clone());
        Ok(TestHarness {
            storage,
            distributor,
            agents,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over a temp database.
pub struct TestHarness {
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// Distributor wired to `storage` for every role.
    pub distributor: Distributor,
    /// Agents seeded by the builder, in creation order.
    pub agents: Vec<Agent>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Seeded agent ID by position.
    pub fn agent_id(&self, index: usize) -> &AgentId {
        &self.agents[index].id
    }

    /// Register another agent after the harness was built.
    pub async fn add_agent(&self, name: &str) -> Result<Agent, LeadflowError> {
        self.storage.create_agent(&fixtures::new_agent(name)).await
    }

    /// Run a distribution over `(first_name, phone)` rows.
    pub async fn distribute(
        &self,
        rows: &[(&str, &str)],
    ) -> Result<DistributionSummary, LeadflowError> {
        let rows: Vec<RawRow> = rows
            .iter()
            .map(|(name, phone)| fixtures::raw_row(name, phone))
            .collect();
        self.distributor.distribute(&rows).await
    }

    /// The agent currently holding `lead_id`, if any.
    pub async fn owner_of(&self, lead_id: &LeadId) -> Result<Option<AgentId>, LeadflowError> {
        Ok(self
            .storage
            .assignment_for_lead(lead_id)
            .await?
            .map(|a| a.agent_id))
    }

    /// Gateway state sharing this harness's storage.
    pub fn gateway_state(&self, auth: AuthConfig) -> GatewayState {
        GatewayState::from_storage(self.storage.clone(), auth)
    }
}
