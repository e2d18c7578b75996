// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment store double that fails bulk writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use leadflow_core::types::{Assignment, AssignmentBatch, AssignmentPlan, AssignmentView};
use leadflow_core::{AgentId, AssignmentStore, LeadId, LeadflowError};

/// Wraps a real store and rejects every `persist_assignments` call with a
/// storage error. Reads and single assignments pass through.
pub struct FailingAssignments {
    inner: Arc<dyn AssignmentStore>,
    attempts: AtomicUsize,
}

impl FailingAssignments {
    pub fn new(inner: Arc<dyn AssignmentStore>) -> Self {
        Self {
            inner,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of bulk writes that were refused.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssignmentStore for FailingAssignments {
    async fn persist_assignments(
        &self,
        _plans: &[AssignmentPlan],
    ) -> Result<AssignmentBatch, LeadflowError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(LeadflowError::storage("assignment table unavailable"))
    }

    async fn assign_one(
        &self,
        lead_id: &LeadId,
        agent_id: &AgentId,
    ) -> Result<Assignment, LeadflowError> {
        self.inner.assign_one(lead_id, agent_id).await
    }

    async fn assignment_for_lead(
        &self,
        lead_id: &LeadId,
    ) -> Result<Option<Assignment>, LeadflowError> {
        self.inner.assignment_for_lead(lead_id).await
    }

    async fn list_assignments(&self) -> Result<Vec<AssignmentView>, LeadflowError> {
        self.inner.list_assignments().await
    }
}
