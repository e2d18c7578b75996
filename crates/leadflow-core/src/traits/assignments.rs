// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment persistence.
//!
//! Implementations must enforce uniqueness of `lead_id` at the storage
//! boundary. That constraint is the only thing keeping two concurrent
//! callers from assigning the same lead twice.

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::types::{AgentId, Assignment, AssignmentBatch, AssignmentPlan, AssignmentView, LeadId};

/// Stores and reads lead assignments.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Insert one assignment per plan, skipping and recording pairs that fail.
    ///
    /// A pair whose lead already has an assignment is rejected with
    /// [`RejectionKind::Duplicate`](crate::types::RejectionKind::Duplicate);
    /// sibling pairs are still attempted.
    async fn persist_assignments(
        &self,
        plans: &[AssignmentPlan],
    ) -> Result<AssignmentBatch, LeadflowError>;

    /// Assign a single lead. Fails with [`LeadflowError::AlreadyAssigned`]
    /// if the lead already has an assignment; the existing one is untouched.
    async fn assign_one(
        &self,
        lead_id: &LeadId,
        agent_id: &AgentId,
    ) -> Result<Assignment, LeadflowError>;

    async fn assignment_for_lead(
        &self,
        lead_id: &LeadId,
    ) -> Result<Option<Assignment>, LeadflowError>;

    /// All assignments joined with lead and agent summaries, newest first.
    async fn list_assignments(&self) -> Result<Vec<AssignmentView>, LeadflowError>;
}
