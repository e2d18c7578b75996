// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`LeadflowError`] to HTTP responses.
//!
//! Every error body carries a human-readable `msg`; some add structured
//! fields so clients can see what was persisted before the failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use leadflow_core::LeadflowError;

/// An error returned from an API handler.
#[derive(Debug)]
pub struct ApiError(pub LeadflowError);

impl From<LeadflowError> for ApiError {
    fn from(e: LeadflowError) -> Self {
        Self(e)
    }
}

impl ApiError {
    /// A 400 for a request body that could not be decoded.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(LeadflowError::InvalidInput(msg.into()))
    }

    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LeadflowError::EmptyBatch
            | LeadflowError::InvalidRows { .. }
            | LeadflowError::InvalidInput(_)
            | LeadflowError::NoAgentsAvailable { .. }
            | LeadflowError::EmptyAgentPool => StatusCode::BAD_REQUEST,
            LeadflowError::DuplicateAssignment { .. }
            | LeadflowError::AlreadyAssigned { .. }
            | LeadflowError::Conflict(_) => StatusCode::CONFLICT,
            LeadflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            LeadflowError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LeadflowError::Config(_)
            | LeadflowError::Storage { .. }
            | LeadflowError::DistributionInterrupted { .. }
            | LeadflowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match &self.0 {
            LeadflowError::EmptyBatch => json!({ "msg": "No leads provided" }),
            LeadflowError::InvalidRows { count, indices } => json!({
                "msg": format!(
                    "Some rows are missing required fields (FirstName, Phone). Found {count} invalid lead(s)."
                ),
                "invalid_rows": indices,
            }),
            LeadflowError::NoAgentsAvailable {
                batch_id,
                leads_created,
                lead_failure,
            } => json!({
                "msg": "No agents available for lead distribution.",
                "batch_id": batch_id,
                "leads_created": leads_created,
                "lead_failure": lead_failure,
            }),
            LeadflowError::AlreadyAssigned { lead_id } => json!({
                "msg": "This lead is already assigned.",
                "lead_id": lead_id,
            }),
            LeadflowError::DistributionInterrupted {
                batch_id,
                leads_created,
                assignments_created,
                ..
            } => json!({
                "msg": "Lead distribution was interrupted by a storage failure.",
                "batch_id": batch_id,
                "leads_created": leads_created,
                "assignments_created": assignments_created,
            }),
            LeadflowError::Storage { .. } | LeadflowError::Config(_) | LeadflowError::Internal(_) => {
                json!({ "msg": "Internal server error" })
            }
            other => json!({ "msg": other.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
