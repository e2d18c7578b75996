// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use leadflow_core::types::{
    Agent, AgentUpdate, Assignment, AssignmentView, DistributionSummary, Lead, NewAgent,
};
use leadflow_core::{AgentId, BatchId, HealthStatus, LeadId, LeadflowError, RawRow};
use leadflow_distribution::parse_csv;

use crate::auth::CallerIdentity;
use crate::error::ApiError;
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

/// Request body for POST /leads/distribute.
#[derive(Debug, Deserialize)]
pub struct DistributeRequest {
    /// Raw spreadsheet rows. Missing is treated like empty.
    #[serde(default)]
    pub leads: Option<Vec<Value>>,
}

/// Successful distribution response.
#[derive(Debug, Serialize)]
pub struct DistributeResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: DistributionSummary,
}

impl From<DistributionSummary> for DistributeResponse {
    fn from(summary: DistributionSummary) -> Self {
        Self {
            message: summary.message(),
            summary,
        }
    }
}

/// Request body for POST /assignments.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub lead_id: LeadId,
    pub agent_id: AgentId,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

/// Non-object entries become empty rows so the validator reports them by index.
fn into_rows(values: Vec<Value>) -> Vec<RawRow> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(map) => map,
            _ => RawRow::new(),
        })
        .collect()
}

/// POST /leads/distribute
///
/// Validates, stores and round-robin-assigns a JSON batch of raw rows.
pub async fn distribute(
    State(state): State<GatewayState>,
    Extension(caller): Extension<CallerIdentity>,
    body: Result<Json<DistributeRequest>, JsonRejection>,
) -> ApiResult<Json<DistributeResponse>> {
    let rows = into_rows(json_body(body)?.leads.unwrap_or_default());
    tracing::info!(caller = %caller, rows = rows.len(), "distribution requested");
    let summary = state.distributor.distribute(&rows).await?;
    Ok(Json(summary.into()))
}

/// POST /leads/upload
///
/// Same as [`distribute`] but takes a `text/csv` body with a header row.
pub async fn upload_csv(
    State(state): State<GatewayState>,
    Extension(caller): Extension<CallerIdentity>,
    body: String,
) -> ApiResult<Json<DistributeResponse>> {
    let rows = parse_csv(body.as_bytes())?;
    tracing::info!(caller = %caller, rows = rows.len(), "CSV upload received");
    let summary = state.distributor.distribute(&rows).await?;
    Ok(Json(summary.into()))
}

/// POST /leads/batches/{batch_id}/assign
///
/// Distributes leads of an earlier batch that were left unassigned.
pub async fn assign_batch(
    State(state): State<GatewayState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(batch_id): Path<String>,
) -> ApiResult<Json<DistributeResponse>> {
    let batch_id = BatchId::from(batch_id);
    tracing::info!(caller = %caller, batch_id = %batch_id, "batch assignment requested");
    let summary = state.distributor.assign_batch(&batch_id).await?;
    Ok(Json(summary.into()))
}

/// GET /leads
pub async fn list_leads(State(state): State<GatewayState>) -> ApiResult<Json<Vec<Lead>>> {
    Ok(Json(state.leads.list_leads().await?))
}

/// POST /leads
///
/// Creates one lead from a raw row. The lead is not assigned.
pub async fn create_lead(
    State(state): State<GatewayState>,
    body: Result<Json<RawRow>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    let row = json_body(body)?;
    let lead = state.distributor.create_lead(&row).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// DELETE /leads/{id}
///
/// Deletes the lead and its assignment.
pub async fn delete_lead(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = LeadId::from(id);
    if !state.leads.delete_lead(&id).await? {
        return Err(LeadflowError::NotFound {
            entity: "lead",
            id: id.to_string(),
        }
        .into());
    }
    Ok(Json(json!({ "msg": "Lead deleted" })))
}

/// GET /assignments
pub async fn list_assignments(
    State(state): State<GatewayState>,
) -> ApiResult<Json<Vec<AssignmentView>>> {
    Ok(Json(state.assignments.list_assignments().await?))
}

/// POST /assignments
///
/// Manually assigns one lead. Fails with 409 when the lead is already assigned.
pub async fn assign_lead(
    State(state): State<GatewayState>,
    Extension(caller): Extension<CallerIdentity>,
    body: Result<Json<AssignRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let request = json_body(body)?;
    let assignment = state
        .assignments
        .assign_one(&request.lead_id, &request.agent_id)
        .await?;
    tracing::info!(
        caller = %caller,
        lead_id = %assignment.lead_id,
        agent_id = %assignment.agent_id,
        "lead assigned manually"
    );
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// GET /agents
pub async fn list_agents(State(state): State<GatewayState>) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(state.agents.list_agents().await?))
}

/// POST /agents
pub async fn create_agent(
    State(state): State<GatewayState>,
    body: Result<Json<NewAgent>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Agent>)> {
    let new = json_body(body)?;
    let agent = state.agents.create_agent(&new).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// GET /agents/{id}
pub async fn get_agent(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Agent>> {
    let id = AgentId::from(id);
    match state.agents.get_agent(&id).await? {
        Some(agent) => Ok(Json(agent)),
        None => Err(LeadflowError::NotFound {
            entity: "agent",
            id: id.to_string(),
        }
        .into()),
    }
}

/// PUT /agents/{id}
///
/// Partial update; absent or blank fields keep their current value.
pub async fn update_agent(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Result<Json<AgentUpdate>, JsonRejection>,
) -> ApiResult<Json<Agent>> {
    let update = json_body(body)?;
    let agent = state
        .agents
        .update_agent(&AgentId::from(id), &update)
        .await?;
    Ok(Json(agent))
}

/// DELETE /agents/{id}
///
/// Deletes the agent along with its assignments; those leads become unassigned.
pub async fn delete_agent(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = AgentId::from(id);
    if !state.agents.delete_agent(&id).await? {
        return Err(LeadflowError::NotFound {
            entity: "agent",
            id: id.to_string(),
        }
        .into());
    }
    Ok(Json(json!({ "msg": "Agent deleted" })))
}

/// GET /health
///
/// Unauthenticated liveness check backed by the storage health check.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let version = env!("CARGO_PKG_VERSION").to_string();
    let (code, status, detail) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok", None),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(e.to_string())),
    };
    let body = HealthResponse {
        status: status.to_string(),
        version,
        detail,
    };
    (code, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribute_request_tolerates_missing_leads() {
        let req: DistributeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.leads.is_none());
    }

    #[test]
    fn non_object_entries_become_empty_rows() {
        let rows = into_rows(vec![json!({"FirstName": "Ann"}), json!(42)]);
        assert_eq!(rows.len(), 2);
        assert!(rows[1].is_empty());
    }

    #[test]
    fn distribute_response_flattens_summary() {
        let summary = DistributionSummary {
            batch_id: BatchId::from("b1"),
            leads_requested: 2,
            leads_created: 2,
            assignments_created: 2,
            lead_failure: None,
            rejected_assignments: vec![],
        };
        let json = serde_json::to_value(DistributeResponse::from(summary)).unwrap();
        assert_eq!(
            json["message"],
            "Successfully processed 2 leads and assigned them to agents."
        );
        assert_eq!(json["batch_id"], "b1");
        assert_eq!(json["assignments_created"], 2);
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            detail: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("detail"));
    }
}
