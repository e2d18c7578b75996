// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Leadflow.

use thiserror::Error;

use crate::types::{BatchFailure, BatchId, LeadId};

/// The primary error type used across all Leadflow trait boundaries and core operations.
#[derive(Debug, Error)]
pub enum LeadflowError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A distribution request carried no rows.
    #[error("no leads provided")]
    EmptyBatch,

    /// One or more rows lack a non-blank first name or phone. The whole batch is rejected.
    #[error(
        "some rows are missing required fields (FirstName, Phone); found {count} invalid lead(s)"
    )]
    InvalidRows {
        /// Number of invalid rows.
        count: usize,
        /// Zero-based positions of the invalid rows in the input.
        indices: Vec<usize>,
    },

    /// The agent pool was empty when the batch reached assignment.
    ///
    /// The batch's leads are already stored at this point and stay unassigned.
    /// `lead_failure` is set when the lead insert also stopped early, so rows
    /// from its index on were never stored.
    #[error("no agents available for lead distribution ({leads_created} lead(s) stored in batch {batch_id})")]
    NoAgentsAvailable {
        batch_id: BatchId,
        leads_created: usize,
        lead_failure: Option<BatchFailure>,
    },

    /// The round-robin assigner was handed an empty agent list.
    #[error("cannot assign leads from an empty agent pool")]
    EmptyAgentPool,

    /// A batch insert hit the unique constraint on `assignments.lead_id`.
    #[error("lead {lead_id} already has an assignment")]
    DuplicateAssignment { lead_id: LeadId },

    /// A manual assignment targeted a lead that is already assigned.
    #[error("this lead is already assigned: {lead_id}")]
    AlreadyAssigned { lead_id: LeadId },

    /// A single-record request carried a missing or malformed field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A write conflicted with an existing record (e.g. duplicate agent email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A storage failure after the batch's leads were already written.
    #[error(
        "distribution of batch {batch_id} interrupted after {leads_created} lead(s) and {assignments_created} assignment(s): {source}"
    )]
    DistributionInterrupted {
        batch_id: BatchId,
        leads_created: usize,
        assignments_created: usize,
        source: Box<LeadflowError>,
    },

    /// Caller identity could not be established.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadflowError {
    /// Wrap any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Returns `true` for errors caused by the caller's input rather than the system.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyBatch
                | Self::InvalidRows { .. }
                | Self::InvalidInput(_)
                | Self::NoAgentsAvailable { .. }
                | Self::EmptyAgentPool
                | Self::DuplicateAssignment { .. }
                | Self::AlreadyAssigned { .. }
        )
    }
}
