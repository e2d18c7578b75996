// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Leadflow.
//!
//! Defines the domain types (leads, agents, assignments, batches), the
//! [`LeadflowError`] type, and the storage traits the distribution pipeline
//! is written against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::LeadflowError;
pub use types::{AgentId, AssignmentId, BatchId, HealthStatus, LeadId, RawRow};

pub use traits::{
    AgentDirectory, AgentPool, AssignmentStore, LeadStore, PluginAdapter, StorageAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BatchFailure, DistributionSummary, RejectionKind};

    fn summary(requested: usize, created: usize, assigned: usize) -> DistributionSummary {
        DistributionSummary {
            batch_id: BatchId::from("batch-1"),
            leads_requested: requested,
            leads_created: created,
            assignments_created: assigned,
            lead_failure: None,
            rejected_assignments: vec![],
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = LeadId::generate();
        let b = LeadId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = AgentId::from("agent-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"agent-7\"");
        assert_eq!(id.to_string(), "agent-7");
    }

    #[test]
    fn complete_summary_message() {
        let s = summary(3, 3, 3);
        assert!(s.is_complete());
        assert_eq!(
            s.message(),
            "Successfully processed 3 leads and assigned them to agents."
        );
    }

    #[test]
    fn empty_summary_says_nothing_was_distributed() {
        let s = summary(0, 0, 0);
        assert!(s.is_complete());
        assert_eq!(s.message(), "No unassigned leads to distribute.");
    }

    #[test]
    fn partial_summary_reports_persisted_counts() {
        let mut s = summary(5, 3, 2);
        s.lead_failure = Some(BatchFailure {
            index: 3,
            reason: "disk full".into(),
        });
        assert!(!s.is_complete());
        assert_eq!(s.message(), "Stored 3 of 5 leads and created 2 assignments.");

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["lead_failure"]["index"], 3);
        assert!(json.get("rejected_assignments").is_none());
    }

    #[test]
    fn rejection_kind_round_trips_through_strum() {
        use std::str::FromStr;
        assert_eq!(RejectionKind::Duplicate.to_string(), "duplicate");
        assert_eq!(
            RejectionKind::from_str("storage").unwrap(),
            RejectionKind::Storage
        );
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(LeadflowError::EmptyBatch.is_input_error());
        assert!(LeadflowError::InvalidRows {
            count: 1,
            indices: vec![0]
        }
        .is_input_error());
        assert!(!LeadflowError::Internal("boom".into()).is_input_error());
        assert!(!LeadflowError::storage(std::io::Error::other("io")).is_input_error());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_lead_store<T: LeadStore>() {}
        fn _assert_agent_pool<T: AgentPool>() {}
        fn _assert_agent_directory<T: AgentDirectory>() {}
        fn _assert_assignment_store<T: AssignmentStore>() {}
    }
}
