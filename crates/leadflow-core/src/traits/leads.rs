// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead persistence.

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::types::{BatchId, Lead, LeadCandidate, LeadId, PersistedBatch};

/// Stores and reads leads.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Store candidates as one upload batch under a freshly generated batch id.
    ///
    /// The insert is ordered and not transactional: it stops at the first
    /// failing candidate, keeps everything stored before it, and reports the
    /// failure in [`PersistedBatch::failure`]. Returned leads keep input order.
    async fn persist_batch(
        &self,
        candidates: &[LeadCandidate],
    ) -> Result<PersistedBatch, LeadflowError>;

    /// All leads, newest first.
    async fn list_leads(&self) -> Result<Vec<Lead>, LeadflowError>;

    async fn get_lead(&self, id: &LeadId) -> Result<Option<Lead>, LeadflowError>;

    /// Delete a lead and its assignment. Returns `false` if the lead did not exist.
    async fn delete_lead(&self, id: &LeadId) -> Result<bool, LeadflowError>;

    /// Leads of a batch with no assignment, in creation order.
    async fn unassigned_in_batch(&self, batch_id: &BatchId) -> Result<Vec<Lead>, LeadflowError>;
}
