// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Leadflow crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A raw spreadsheet row: header name to cell value, as produced by upload intake.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a fresh random identifier (UUID v4).
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a lead.
    LeadId
);
string_id!(
    /// Unique identifier for an agent.
    AgentId
);
string_id!(
    /// Unique identifier for an assignment.
    AssignmentId
);
string_id!(
    /// Identifier shared by every lead created from one upload.
    BatchId
);

/// Current UTC time in the millisecond ISO 8601 format used for every stored timestamp.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// A validated, normalized lead that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadCandidate {
    pub first_name: String,
    pub phone: String,
    pub notes: Option<String>,
}

/// A stored lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub first_name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub upload_batch_id: BatchId,
    pub created_at: String,
}

/// A staff member who can receive leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub country_code: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for registering a new agent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAgent {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    /// Defaults to `+1` when absent.
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Partial update of an agent. `None` (or blank) fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// The durable link from one lead to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub lead_id: LeadId,
    pub agent_id: AgentId,
    pub assigned_at: String,
}

/// A lead-to-agent pairing produced by the assigner and not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    pub lead_id: LeadId,
    pub agent_id: AgentId,
}

/// Lead fields shown alongside an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSummary {
    pub id: LeadId,
    pub first_name: String,
    pub phone: String,
    pub notes: Option<String>,
}

/// Agent fields shown alongside an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: AgentId,
    pub name: String,
    pub email: String,
}

/// An assignment joined with its lead and agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentView {
    pub id: AssignmentId,
    pub assigned_at: String,
    pub lead: LeadSummary,
    pub agent: AgentSummary,
}

/// The row at which an ordered bulk insert stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Zero-based position of the failing candidate; later candidates were not attempted.
    pub index: usize,
    pub reason: String,
}

/// Outcome of storing one upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBatch {
    pub batch_id: BatchId,
    /// Stored leads, in input order.
    pub leads: Vec<Lead>,
    /// Set when the insert stopped before the end of the input.
    pub failure: Option<BatchFailure>,
}

/// Why a single assignment insert was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RejectionKind {
    /// The lead already has an assignment.
    Duplicate,
    /// Any other storage failure for this pair.
    Storage,
}

/// An assignment pair that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedAssignment {
    pub lead_id: LeadId,
    pub agent_id: AgentId,
    pub kind: RejectionKind,
    pub reason: String,
}

/// Outcome of a skip-and-continue bulk assignment insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentBatch {
    pub inserted: Vec<Assignment>,
    pub rejected: Vec<RejectedAssignment>,
}

/// What one distribution run actually persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub batch_id: BatchId,
    /// Rows accepted by validation.
    pub leads_requested: usize,
    pub leads_created: usize,
    pub assignments_created: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_failure: Option<BatchFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_assignments: Vec<RejectedAssignment>,
}

impl DistributionSummary {
    /// Every requested lead was stored and assigned.
    pub fn is_complete(&self) -> bool {
        self.leads_created == self.leads_requested
            && self.assignments_created == self.leads_created
    }

    /// Human-readable result line reported to API and CLI callers.
    pub fn message(&self) -> String {
        if self.leads_requested == 0 && self.leads_created == 0 {
            "No unassigned leads to distribute.".to_string()
        } else if self.is_complete() {
            format!(
                "Successfully processed {} leads and assigned them to agents.",
                self.leads_created
            )
        } else {
            format!(
                "Stored {} of {} leads and created {} assignments.",
                self.leads_created, self.leads_requested, self.assignments_created
            )
        }
    }
}
