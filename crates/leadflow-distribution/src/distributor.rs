// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The distribution run: validate, store leads, snapshot agents, pair, store assignments.
//!
//! The two writes (leads, then assignments) are not atomic. Once leads are
//! stored they stay stored whatever happens next, and every result reports
//! leads and assignments separately so callers can tell how far a run got.

use std::sync::Arc;

use tracing::{info, warn};

use leadflow_core::types::{DistributionSummary, Lead, PersistedBatch};
use leadflow_core::{AgentPool, AssignmentStore, BatchId, LeadStore, LeadflowError, RawRow};

use crate::{round_robin, validator};

/// Runs lead distribution against a set of storage backends.
#[derive(Clone)]
pub struct Distributor {
    leads: Arc<dyn LeadStore>,
    agents: Arc<dyn AgentPool>,
    assignments: Arc<dyn AssignmentStore>,
}

impl Distributor {
    pub fn new(
        leads: Arc<dyn LeadStore>,
        agents: Arc<dyn AgentPool>,
        assignments: Arc<dyn AssignmentStore>,
    ) -> Self {
        Self {
            leads,
            agents,
            assignments,
        }
    }

    /// Ingest and distribute one upload.
    ///
    /// Validation failures write nothing. An empty agent pool leaves the
    /// stored leads unassigned and fails with
    /// [`LeadflowError::NoAgentsAvailable`]; use [`assign_batch`](Self::assign_batch)
    /// once agents exist. Storage failures after the first lead is stored are
    /// reported as [`LeadflowError::DistributionInterrupted`].
    pub async fn distribute(&self, rows: &[RawRow]) -> Result<DistributionSummary, LeadflowError> {
        let candidates = validator::validate(rows)?;
        let requested = candidates.len();

        let PersistedBatch {
            batch_id,
            leads,
            failure,
        } = self.leads.persist_batch(&candidates).await?;

        if let Some(failure) = &failure {
            warn!(
                batch_id = %batch_id,
                index = failure.index,
                reason = %failure.reason,
                stored = leads.len(),
                "lead batch insert stopped early"
            );
            if leads.is_empty() {
                return Err(LeadflowError::storage(format!(
                    "no leads stored: row {} failed: {}",
                    failure.index, failure.reason
                )));
            }
        }
        info!(batch_id = %batch_id, leads = leads.len(), "lead batch stored");

        let mut summary = match self.assign_leads(&batch_id, &leads).await {
            Ok(summary) => summary,
            Err(LeadflowError::NoAgentsAvailable {
                batch_id,
                leads_created,
                ..
            }) => {
                return Err(LeadflowError::NoAgentsAvailable {
                    batch_id,
                    leads_created,
                    lead_failure: failure,
                });
            }
            Err(e) => return Err(e),
        };
        summary.leads_requested = requested;
        summary.lead_failure = failure;
        Ok(summary)
    }

    /// Distribute the still-unassigned leads of an earlier batch.
    ///
    /// Leads that already hold an assignment are left where they are.
    pub async fn assign_batch(
        &self,
        batch_id: &BatchId,
    ) -> Result<DistributionSummary, LeadflowError> {
        let leads = self.leads.unassigned_in_batch(batch_id).await?;
        if leads.is_empty() {
            info!(batch_id = %batch_id, "no unassigned leads in batch");
        }
        self.assign_leads(batch_id, &leads).await
    }

    /// Validate and store a single lead under its own batch, without assigning it.
    pub async fn create_lead(&self, row: &RawRow) -> Result<Lead, LeadflowError> {
        let candidates = validator::validate(std::slice::from_ref(row))?;
        let batch = self.leads.persist_batch(&candidates).await?;
        match (batch.leads.into_iter().next(), batch.failure) {
            (Some(lead), _) => Ok(lead),
            (None, Some(failure)) => Err(LeadflowError::storage(failure.reason)),
            (None, None) => Err(LeadflowError::Internal(
                "lead insert reported neither a lead nor a failure".into(),
            )),
        }
    }

    /// Snapshot agents, pair them with `leads` and store the pairs.
    async fn assign_leads(
        &self,
        batch_id: &BatchId,
        leads: &[Lead],
    ) -> Result<DistributionSummary, LeadflowError> {
        let created = leads.len();
        let interrupted = |source: LeadflowError| LeadflowError::DistributionInterrupted {
            batch_id: batch_id.clone(),
            leads_created: created,
            assignments_created: 0,
            source: Box::new(source),
        };

        let mut summary = DistributionSummary {
            batch_id: batch_id.clone(),
            leads_requested: created,
            leads_created: created,
            assignments_created: 0,
            lead_failure: None,
            rejected_assignments: Vec::new(),
        };
        if leads.is_empty() {
            return Ok(summary);
        }

        let agents = self.agents.snapshot().await.map_err(interrupted)?;
        if agents.is_empty() {
            warn!(
                batch_id = %batch_id,
                leads = created,
                "no agents available; leads left unassigned"
            );
            return Err(LeadflowError::NoAgentsAvailable {
                batch_id: batch_id.clone(),
                leads_created: created,
                lead_failure: None,
            });
        }

        let plans = round_robin::assign(leads, &agents)?;
        let stored = self
            .assignments
            .persist_assignments(&plans)
            .await
            .map_err(interrupted)?;

        summary.assignments_created = stored.inserted.len();
        summary.rejected_assignments = stored.rejected;
        info!(
            batch_id = %batch_id,
            leads = created,
            agents = agents.len(),
            assignments = summary.assignments_created,
            rejected = summary.rejected_assignments.len(),
            "batch distributed"
        );
        Ok(summary)
    }
}
