// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment inserts and the joined assignment listing.
//!
//! `assignments.lead_id` is UNIQUE: a lead can be assigned at most once no
//! matter how many writers race. Every insert here leans on that constraint
//! rather than a read-then-write check.

use leadflow_core::LeadflowError;
use leadflow_core::types::{
    AgentId, AgentSummary, Assignment, AssignmentBatch, AssignmentId, AssignmentPlan,
    AssignmentView, LeadId, LeadSummary, RejectedAssignment, RejectionKind, now_timestamp,
};
use rusqlite::{OptionalExtension, params};
use tracing::warn;

use crate::database::{Database, is_unique_violation};

const INSERT_ASSIGNMENT: &str =
    "INSERT INTO assignments (id, lead_id, agent_id, assigned_at) VALUES (?1, ?2, ?3, ?4)";

/// Store each plan independently.
///
/// A pair that fails (duplicate lead or any other storage error) is recorded
/// in [`AssignmentBatch::rejected`] and the remaining pairs are still attempted.
pub async fn insert_plans(
    db: &Database,
    plans: &[AssignmentPlan],
) -> Result<AssignmentBatch, LeadflowError> {
    let plans = plans.to_vec();
    let batch = db
        .connection()
        .call(move |conn| -> Result<AssignmentBatch, rusqlite::Error> {
            let mut stmt = conn.prepare(INSERT_ASSIGNMENT)?;
            let mut batch = AssignmentBatch::default();
            for plan in plans {
                let assignment = Assignment {
                    id: AssignmentId::generate(),
                    lead_id: plan.lead_id,
                    agent_id: plan.agent_id,
                    assigned_at: now_timestamp(),
                };
                let result = stmt.execute(params![
                    assignment.id.as_str(),
                    assignment.lead_id.as_str(),
                    assignment.agent_id.as_str(),
                    assignment.assigned_at,
                ]);
                match result {
                    Ok(_) => batch.inserted.push(assignment),
                    Err(e) => {
                        let (kind, reason) = if is_unique_violation(&e) {
                            let duplicate = LeadflowError::DuplicateAssignment {
                                lead_id: assignment.lead_id.clone(),
                            };
                            (RejectionKind::Duplicate, duplicate.to_string())
                        } else {
                            (RejectionKind::Storage, e.to_string())
                        };
                        batch.rejected.push(RejectedAssignment {
                            lead_id: assignment.lead_id,
                            agent_id: assignment.agent_id,
                            kind,
                            reason,
                        });
                    }
                }
            }
            Ok(batch)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    for rejected in &batch.rejected {
        warn!(
            lead_id = %rejected.lead_id,
            agent_id = %rejected.agent_id,
            kind = %rejected.kind,
            reason = %rejected.reason,
            "assignment rejected"
        );
    }
    Ok(batch)
}

enum AssignOutcome {
    Assigned(Assignment),
    LeadMissing,
    AgentMissing,
    AlreadyAssigned,
}

/// Manually assign one lead to one agent.
pub async fn assign_one(
    db: &Database,
    lead_id: &LeadId,
    agent_id: &AgentId,
) -> Result<Assignment, LeadflowError> {
    let assignment = Assignment {
        id: AssignmentId::generate(),
        lead_id: lead_id.clone(),
        agent_id: agent_id.clone(),
        assigned_at: now_timestamp(),
    };
    let outcome = db
        .connection()
        .call(move |conn| -> Result<AssignOutcome, rusqlite::Error> {
            let exists = |sql: &str, id: &str| -> Result<bool, rusqlite::Error> {
                Ok(conn
                    .query_row(sql, params![id], |_| Ok(()))
                    .optional()?
                    .is_some())
            };
            if !exists("SELECT 1 FROM leads WHERE id = ?1", assignment.lead_id.as_str())? {
                return Ok(AssignOutcome::LeadMissing);
            }
            if !exists("SELECT 1 FROM agents WHERE id = ?1", assignment.agent_id.as_str())? {
                return Ok(AssignOutcome::AgentMissing);
            }

            let result = conn.execute(
                INSERT_ASSIGNMENT,
                params![
                    assignment.id.as_str(),
                    assignment.lead_id.as_str(),
                    assignment.agent_id.as_str(),
                    assignment.assigned_at,
                ],
            );
            match result {
                Ok(_) => Ok(AssignOutcome::Assigned(assignment)),
                Err(e) if is_unique_violation(&e) => Ok(AssignOutcome::AlreadyAssigned),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        AssignOutcome::Assigned(assignment) => Ok(assignment),
        AssignOutcome::LeadMissing => Err(LeadflowError::NotFound {
            entity: "lead",
            id: lead_id.to_string(),
        }),
        AssignOutcome::AgentMissing => Err(LeadflowError::NotFound {
            entity: "agent",
            id: agent_id.to_string(),
        }),
        AssignOutcome::AlreadyAssigned => Err(LeadflowError::AlreadyAssigned {
            lead_id: lead_id.clone(),
        }),
    }
}

/// The assignment holding `lead_id`, if any.
pub async fn assignment_for_lead(
    db: &Database,
    lead_id: &LeadId,
) -> Result<Option<Assignment>, LeadflowError> {
    let lead_id = lead_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Assignment>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, lead_id, agent_id, assigned_at FROM assignments WHERE lead_id = ?1",
                params![lead_id],
                |row| {
                    Ok(Assignment {
                        id: AssignmentId(row.get(0)?),
                        lead_id: LeadId(row.get(1)?),
                        agent_id: AgentId(row.get(2)?),
                        assigned_at: row.get(3)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All assignments joined with their lead and agent, newest first.
pub async fn list_assignments(db: &Database) -> Result<Vec<AssignmentView>, LeadflowError> {
    db.connection()
        .call(|conn| -> Result<Vec<AssignmentView>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.assigned_at,
                        l.id, l.first_name, l.phone, l.notes,
                        g.id, g.name, g.email
                 FROM assignments a
                 JOIN leads l ON l.id = a.lead_id
                 JOIN agents g ON g.id = a.agent_id
                 ORDER BY a.seq DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(AssignmentView {
                    id: AssignmentId(row.get(0)?),
                    assigned_at: row.get(1)?,
                    lead: LeadSummary {
                        id: LeadId(row.get(2)?),
                        first_name: row.get(3)?,
                        phone: row.get(4)?,
                        notes: row.get(5)?,
                    },
                    agent: AgentSummary {
                        id: AgentId(row.get(6)?),
                        name: row.get(7)?,
                        email: row.get(8)?,
                    },
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{agents, leads};
    use leadflow_core::types::{Agent, Lead, LeadCandidate, NewAgent};

    async fn seed(db: &Database, lead_count: usize) -> (Vec<Lead>, Agent) {
        let candidates: Vec<_> = (0..lead_count)
            .map(|i| LeadCandidate {
                first_name: format!("Lead{i}"),
                phone: format!("555{i}"),
                notes: None,
            })
            .collect();
        let batch = leads::persist_batch(db, &candidates).await.unwrap();
        let agent = agents::create_agent(
            db,
            &NewAgent {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                mobile_number: "1".into(),
                country_code: None,
            },
        )
        .await
        .unwrap();
        (batch.leads, agent)
    }

    fn plan(lead: &Lead, agent: &Agent) -> AssignmentPlan {
        AssignmentPlan {
            lead_id: lead.id.clone(),
            agent_id: agent.id.clone(),
        }
    }

    #[tokio::test]
    async fn insert_plans_skips_duplicates_and_continues() {
        let db = Database::open_in_memory().await.unwrap();
        let (leads, agent) = seed(&db, 2).await;

        let plans = vec![plan(&leads[0], &agent), plan(&leads[0], &agent), plan(&leads[1], &agent)];
        let batch = insert_plans(&db, &plans).await.unwrap();

        assert_eq!(batch.inserted.len(), 2);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].kind, RejectionKind::Duplicate);
        assert_eq!(batch.rejected[0].lead_id, leads[0].id);
        assert!(batch.rejected[0].reason.contains("already has an assignment"));
    }

    #[tokio::test]
    async fn insert_plans_reports_unknown_lead_as_storage_rejection() {
        let db = Database::open_in_memory().await.unwrap();
        let (leads, agent) = seed(&db, 1).await;

        let ghost = AssignmentPlan {
            lead_id: LeadId::from("ghost"),
            agent_id: agent.id.clone(),
        };
        let batch = insert_plans(&db, &[ghost, plan(&leads[0], &agent)])
            .await
            .unwrap();

        assert_eq!(batch.inserted.len(), 1);
        assert_eq!(batch.rejected[0].kind, RejectionKind::Storage);
    }

    #[tokio::test]
    async fn assign_one_rejects_second_assignment() {
        let db = Database::open_in_memory().await.unwrap();
        let (leads, agent) = seed(&db, 1).await;

        let first = assign_one(&db, &leads[0].id, &agent.id).await.unwrap();
        assert_eq!(first.lead_id, leads[0].id);

        let err = assign_one(&db, &leads[0].id, &agent.id).await.unwrap_err();
        assert!(matches!(err, LeadflowError::AlreadyAssigned { .. }));

        let held = assignment_for_lead(&db, &leads[0].id).await.unwrap().unwrap();
        assert_eq!(held, first);
    }

    #[tokio::test]
    async fn assign_one_requires_existing_lead_and_agent() {
        let db = Database::open_in_memory().await.unwrap();
        let (leads, agent) = seed(&db, 1).await;

        let err = assign_one(&db, &LeadId::from("ghost"), &agent.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LeadflowError::NotFound { entity: "lead", .. }));

        let err = assign_one(&db, &leads[0].id, &AgentId::from("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeadflowError::NotFound { entity: "agent", .. }));
    }

    #[tokio::test]
    async fn list_assignments_joins_lead_and_agent() {
        let db = Database::open_in_memory().await.unwrap();
        let (leads, agent) = seed(&db, 2).await;
        insert_plans(&db, &[plan(&leads[0], &agent), plan(&leads[1], &agent)])
            .await
            .unwrap();

        let views = list_assignments(&db).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].lead.first_name, "Lead1");
        assert_eq!(views[1].lead.first_name, "Lead0");
        assert!(views.iter().all(|v| v.agent.email == "ada@example.com"));
    }

    #[tokio::test]
    async fn deleting_lead_or_agent_removes_assignments() {
        let db = Database::open_in_memory().await.unwrap();
        let (leads, agent) = seed(&db, 2).await;
        insert_plans(&db, &[plan(&leads[0], &agent), plan(&leads[1], &agent)])
            .await
            .unwrap();

        leads::delete_lead(&db, &leads[0].id).await.unwrap();
        assert!(assignment_for_lead(&db, &leads[0].id).await.unwrap().is_none());
        assert_eq!(list_assignments(&db).await.unwrap().len(), 1);

        agents::delete_agent(&db, &agent.id).await.unwrap();
        assert!(list_assignments(&db).await.unwrap().is_empty());
        assert!(leads::get_lead(&db, &leads[1].id).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_assign_one_has_a_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("race.db");
        let path = path.to_str().unwrap();
        let first = Database::open(path).await.unwrap();
        let second = Database::open(path).await.unwrap();
        let (leads, agent) = seed(&first, 10).await;

        for lead in &leads {
            let spawn_assign = |db: Database| {
                let lead_id = lead.id.clone();
                let agent_id = agent.id.clone();
                tokio::spawn(async move { assign_one(&db, &lead_id, &agent_id).await })
            };
            let a = spawn_assign(first.clone());
            let b = spawn_assign(second.clone());
            let results = [a.await.unwrap(), b.await.unwrap()];

            let won = results.iter().filter(|r| r.is_ok()).count();
            let lost = results
                .iter()
                .filter(|r| matches!(r, Err(LeadflowError::AlreadyAssigned { .. })))
                .count();
            assert_eq!((won, lost), (1, 1), "lead {} results: {results:?}", lead.id);

            let held = assignment_for_lead(&second, &lead.id).await.unwrap().unwrap();
            let winner = results.iter().find_map(|r| r.as_ref().ok()).unwrap();
            assert_eq!(&held, winner);
        }
    }
}
