// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Leadflow pipeline.
//!
//! Each test creates an isolated TestHarness over a temp SQLite file. Tests
//! are independent and order-insensitive.

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode};
use leadflow_core::{AgentDirectory, AssignmentStore, LeadStore, LeadflowError};
use leadflow_distribution::Distributor;
use leadflow_gateway::{AuthConfig, build_router, mint_token};
use leadflow_test_utils::{FailingAssignments, TestHarness};
use serde_json::{Value, json};
use tower::ServiceExt;

// ---- Round-robin distribution ----

#[tokio::test]
async fn test_three_leads_two_agents_alternate() {
    let harness = TestHarness::builder()
        .with_agents(&["A1", "A2"])
        .build()
        .await
        .unwrap();

    let summary = harness
        .distribute(&[("Ann", "555-0001"), ("Bo", "555-0002"), ("Cy", "555-0003")])
        .await
        .unwrap();
    assert_eq!(summary.leads_created, 3);
    assert_eq!(summary.assignments_created, 3);

    let mut leads = harness.storage.list_leads().await.unwrap();
    leads.reverse();
    assert_eq!(leads.len(), 3);
    assert!(leads.iter().all(|l| l.upload_batch_id == summary.batch_id));

    let expected = [
        ("Ann", harness.agent_id(0)),
        ("Bo", harness.agent_id(1)),
        ("Cy", harness.agent_id(0)),
    ];
    for (lead, (name, agent)) in leads.iter().zip(expected) {
        assert_eq!(lead.first_name, name);
        assert_eq!(harness.owner_of(&lead.id).await.unwrap().as_ref(), Some(agent));
    }
}

#[tokio::test]
async fn test_five_leads_two_agents_pattern() {
    let harness = TestHarness::builder()
        .with_agents(&["A1", "A2"])
        .build()
        .await
        .unwrap();

    harness
        .distribute(&[("L1", "1"), ("L2", "2"), ("L3", "3"), ("L4", "4"), ("L5", "5")])
        .await
        .unwrap();

    let mut leads = harness.storage.list_leads().await.unwrap();
    leads.reverse();
    let mut owners = Vec::new();
    for lead in &leads {
        owners.push(harness.owner_of(&lead.id).await.unwrap().unwrap());
    }
    let a1 = harness.agent_id(0).clone();
    let a2 = harness.agent_id(1).clone();
    assert_eq!(owners, vec![a1.clone(), a2.clone(), a1.clone(), a2, a1]);
}

#[tokio::test]
async fn test_single_agent_receives_every_lead() {
    let harness = TestHarness::builder()
        .with_agents(&["Solo"])
        .build()
        .await
        .unwrap();

    harness
        .distribute(&[("Ann", "1"), ("Bo", "2"), ("Cy", "3")])
        .await
        .unwrap();

    for view in harness.storage.list_assignments().await.unwrap() {
        assert_eq!(&view.agent.id, harness.agent_id(0));
    }
}

// ---- Validation ----

#[tokio::test]
async fn test_invalid_batch_writes_nothing() {
    let harness = TestHarness::builder()
        .with_agents(&["A1"])
        .build()
        .await
        .unwrap();

    let err = harness
        .distribute(&[("Ann", "1"), ("", "2")])
        .await
        .unwrap_err();
    assert!(matches!(err, LeadflowError::InvalidRows { count: 1, .. }));
    assert!(harness.storage.list_leads().await.unwrap().is_empty());

    let err = harness.distribute(&[]).await.unwrap_err();
    assert!(matches!(err, LeadflowError::EmptyBatch));
}

// ---- No agents, then recovery via assign_batch ----

#[tokio::test]
async fn test_no_agents_keeps_leads_for_later_assignment() {
    let harness = TestHarness::builder().build().await.unwrap();

    let err = harness
        .distribute(&[("Ann", "1"), ("Bo", "2")])
        .await
        .unwrap_err();
    let batch_id = match err {
        LeadflowError::NoAgentsAvailable {
            batch_id,
            leads_created,
            lead_failure,
        } => {
            assert_eq!(leads_created, 2);
            assert!(lead_failure.is_none());
            batch_id
        }
        other => panic!("expected NoAgentsAvailable, got {other:?}"),
    };
    assert_eq!(harness.storage.list_leads().await.unwrap().len(), 2);
    assert!(harness.storage.list_assignments().await.unwrap().is_empty());

    let agent = harness.add_agent("Late").await.unwrap();
    let summary = harness.distributor.assign_batch(&batch_id).await.unwrap();
    assert_eq!(summary.assignments_created, 2);
    for view in harness.storage.list_assignments().await.unwrap() {
        assert_eq!(view.agent.id, agent.id);
    }

    let again = harness.distributor.assign_batch(&batch_id).await.unwrap();
    assert_eq!(again.assignments_created, 0);
}

// ---- Uniqueness of assignments ----

#[tokio::test]
async fn test_manual_reassignment_is_rejected() {
    let harness = TestHarness::builder()
        .with_agents(&["A1", "A2"])
        .build()
        .await
        .unwrap();
    harness.distribute(&[("Ann", "1")]).await.unwrap();
    let lead = harness.storage.list_leads().await.unwrap().remove(0);

    let err = harness
        .storage
        .assign_one(&lead.id, harness.agent_id(1))
        .await
        .unwrap_err();
    assert!(matches!(err, LeadflowError::AlreadyAssigned { .. }));
    assert_eq!(
        harness.owner_of(&lead.id).await.unwrap().as_ref(),
        Some(harness.agent_id(0))
    );
}

#[tokio::test]
async fn test_removing_agent_frees_its_leads() {
    let harness = TestHarness::builder()
        .with_agents(&["A1", "A2"])
        .build()
        .await
        .unwrap();
    let summary = harness
        .distribute(&[("Ann", "1"), ("Bo", "2")])
        .await
        .unwrap();

    assert!(harness.storage.delete_agent(harness.agent_id(0)).await.unwrap());
    let freed = harness
        .storage
        .unassigned_in_batch(&summary.batch_id)
        .await
        .unwrap();
    assert_eq!(freed.len(), 1);
    assert_eq!(freed[0].first_name, "Ann");

    let summary = harness
        .distributor
        .assign_batch(&summary.batch_id)
        .await
        .unwrap();
    assert_eq!(summary.assignments_created, 1);
    assert_eq!(
        harness.owner_of(&freed[0].id).await.unwrap().as_ref(),
        Some(harness.agent_id(1))
    );
}

// ---- Storage failure after leads are stored ----

#[tokio::test]
async fn test_assignment_failure_reports_partial_progress() {
    let harness = TestHarness::builder()
        .with_agents(&["A1"])
        .build()
        .await
        .unwrap();
    let failing = Arc::new(FailingAssignments::new(harness.storage.clone()));
    let distributor = Distributor::new(
        harness.storage.clone(),
        harness.storage.clone(),
        failing.clone(),
    );

    let rows = vec![leadflow_test_utils::fixtures::raw_row("Ann", "1")];
    let err = distributor.distribute(&rows).await.unwrap_err();
    match err {
        LeadflowError::DistributionInterrupted {
            leads_created,
            assignments_created,
            ..
        } => {
            assert_eq!(leads_created, 1);
            assert_eq!(assignments_created, 0);
        }
        other => panic!("expected DistributionInterrupted, got {other:?}"),
    }
    assert_eq!(failing.attempts(), 1);
    assert_eq!(harness.storage.list_leads().await.unwrap().len(), 1);
}

// ---- Listings ----

#[tokio::test]
async fn test_repeated_listings_are_identical() {
    let harness = TestHarness::builder()
        .with_agents(&["A1", "A2"])
        .build()
        .await
        .unwrap();
    harness
        .distribute(&[("Ann", "1"), ("Bo", "2"), ("Cy", "3")])
        .await
        .unwrap();

    let first = harness.storage.list_assignments().await.unwrap();
    let second = harness.storage.list_assignments().await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_agent_listing_is_newest_first() {
    let harness = TestHarness::builder()
        .with_agents(&["A1", "A2", "A3"])
        .build()
        .await
        .unwrap();
    let names: Vec<_> = harness
        .storage
        .list_agents()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["A3", "A2", "A1"]);
}

// ---- HTTP surface over file-backed storage ----

#[tokio::test]
async fn test_agent_token_drives_distribution_over_http() {
    let harness = TestHarness::builder()
        .with_agents(&["A1", "A2"])
        .build()
        .await
        .unwrap();
    let auth = AuthConfig {
        bearer_token: None,
        token_secret: Some("e2e-secret".into()),
    };
    let token = mint_token("e2e-secret", harness.agent_id(0));
    let app = build_router(harness.gateway_state(auth));

    let body = json!({
        "leads": [
            { "FirstName": "Ann", "Phone": "555-0001", "Notes": "call after 5" },
            { "first_name": "Bo", "phone": 5550002 },
        ]
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/leads/distribute")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["leads_created"], 2);
    assert_eq!(json["assignments_created"], 2);

    let mut leads = harness.storage.list_leads().await.unwrap();
    leads.reverse();
    assert_eq!(leads[0].notes.as_deref(), Some("call after 5"));
    assert_eq!(leads[1].phone, "5550002");
}
