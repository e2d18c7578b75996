// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the Leadflow storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use leadflow_config::model::StorageConfig;
use leadflow_core::types::{
    Agent, AgentUpdate, Assignment, AssignmentBatch, AssignmentPlan, AssignmentView, Lead,
    LeadCandidate, NewAgent, PersistedBatch,
};
use leadflow_core::{
    AgentDirectory, AgentId, AgentPool, AssignmentStore, BatchId, HealthStatus, LeadId,
    LeadStore, LeadflowError, PluginAdapter, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// One value serves as lead store, agent pool, agent directory and
/// assignment store. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](StorageAdapter::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, LeadflowError> {
        let storage = Self::new(config);
        storage.initialize().await?;
        Ok(storage)
    }

    /// Wrap an already-open database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, LeadflowError> {
        self.db
            .get()
            .ok_or_else(|| LeadflowError::storage("storage not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".into()));
        };
        let check = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        match check {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), LeadflowError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), LeadflowError> {
        let path = &self.config.database_path;
        let db = Database::open_with(path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| LeadflowError::storage("storage already initialized"))?;
        debug!(path = %path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LeadflowError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl LeadStore for SqliteStorage {
    async fn persist_batch(
        &self,
        candidates: &[LeadCandidate],
    ) -> Result<PersistedBatch, LeadflowError> {
        queries::leads::persist_batch(self.db()?, candidates).await
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, LeadflowError> {
        queries::leads::list_leads(self.db()?).await
    }

    async fn get_lead(&self, id: &LeadId) -> Result<Option<Lead>, LeadflowError> {
        queries::leads::get_lead(self.db()?, id).await
    }

    async fn delete_lead(&self, id: &LeadId) -> Result<bool, LeadflowError> {
        queries::leads::delete_lead(self.db()?, id).await
    }

    async fn unassigned_in_batch(&self, batch_id: &BatchId) -> Result<Vec<Lead>, LeadflowError> {
        queries::leads::unassigned_in_batch(self.db()?, batch_id).await
    }
}

#[async_trait]
impl AgentPool for SqliteStorage {
    async fn snapshot(&self) -> Result<Vec<Agent>, LeadflowError> {
        queries::agents::snapshot(self.db()?).await
    }
}

#[async_trait]
impl AgentDirectory for SqliteStorage {
    async fn create_agent(&self, agent: &NewAgent) -> Result<Agent, LeadflowError> {
        queries::agents::create_agent(self.db()?, agent).await
    }

    async fn list_agents(&self) -> Result<Vec<Agent>, LeadflowError> {
        queries::agents::list_agents(self.db()?).await
    }

    async fn get_agent(&self, id: &AgentId) -> Result<Option<Agent>, LeadflowError> {
        queries::agents::get_agent(self.db()?, id).await
    }

    async fn update_agent(
        &self,
        id: &AgentId,
        update: &AgentUpdate,
    ) -> Result<Agent, LeadflowError> {
        queries::agents::update_agent(self.db()?, id, update).await
    }

    async fn delete_agent(&self, id: &AgentId) -> Result<bool, LeadflowError> {
        queries::agents::delete_agent(self.db()?, id).await
    }
}

#[async_trait]
impl AssignmentStore for SqliteStorage {
    async fn persist_assignments(
        &self,
        plans: &[AssignmentPlan],
    ) -> Result<AssignmentBatch, LeadflowError> {
        queries::assignments::insert_plans(self.db()?, plans).await
    }

    async fn assign_one(
        &self,
        lead_id: &LeadId,
        agent_id: &AgentId,
    ) -> Result<Assignment, LeadflowError> {
        queries::assignments::assign_one(self.db()?, lead_id, agent_id).await
    }

    async fn assignment_for_lead(
        &self,
        lead_id: &LeadId,
    ) -> Result<Option<Assignment>, LeadflowError> {
        queries::assignments::assignment_for_lead(self.db()?, lead_id).await
    }

    async fn list_assignments(&self) -> Result<Vec<AssignmentView>, LeadflowError> {
        queries::assignments::list_assignments(self.db()?).await
    }
}
