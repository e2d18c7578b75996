// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent directory CRUD and the round-robin snapshot.

use leadflow_core::LeadflowError;
use leadflow_core::types::{Agent, AgentId, AgentUpdate, NewAgent, now_timestamp};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, is_unique_violation};

const AGENT_COLUMNS: &str =
    "id, name, email, mobile_number, country_code, created_at, updated_at";

/// Country code stored when none is supplied.
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

fn agent_from_row(row: &Row<'_>) -> rusqlite::Result<Agent> {
    Ok(Agent {
        id: AgentId(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        mobile_number: row.get(3)?,
        country_code: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn required(field: &str, value: &str) -> Result<String, LeadflowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LeadflowError::InvalidInput(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Keep only the fields of `value` that carry non-blank text.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn email_taken(email: &str) -> LeadflowError {
    LeadflowError::Conflict(format!("an agent with email {email} already exists"))
}

/// Register a new agent. Fails with `Conflict` when the email is already used.
pub async fn create_agent(db: &Database, new: &NewAgent) -> Result<Agent, LeadflowError> {
    let now = now_timestamp();
    let agent = Agent {
        id: AgentId::generate(),
        name: required("name", &new.name)?,
        email: required("email", &new.email)?,
        mobile_number: required("mobile_number", &new.mobile_number)?,
        country_code: present(&new.country_code)
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
        created_at: now.clone(),
        updated_at: now,
    };

    let row = agent.clone();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let result = conn.execute(
                "INSERT INTO agents (id, name, email, mobile_number, country_code, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.id.as_str(),
                    row.name,
                    row.email,
                    row.mobile_number,
                    row.country_code,
                    row.created_at,
                    row.updated_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if !inserted {
        return Err(email_taken(&agent.email));
    }
    Ok(agent)
}

/// Agents in creation order. This is the order round-robin walks.
pub async fn snapshot(db: &Database) -> Result<Vec<Agent>, LeadflowError> {
    query_agents(db, "ORDER BY seq ASC").await
}

/// Agents, newest first.
pub async fn list_agents(db: &Database) -> Result<Vec<Agent>, LeadflowError> {
    query_agents(db, "ORDER BY seq DESC").await
}

async fn query_agents(db: &Database, order: &'static str) -> Result<Vec<Agent>, LeadflowError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Agent>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!("SELECT {AGENT_COLUMNS} FROM agents {order}"))?;
            let rows = stmt.query_map([], agent_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an agent by ID.
pub async fn get_agent(db: &Database, id: &AgentId) -> Result<Option<Agent>, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Agent>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = ?1"),
                params![id],
                agent_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

enum UpdateOutcome {
    Updated(Agent),
    Missing,
    EmailTaken(String),
}

/// Apply the non-blank fields of `update` to an existing agent.
pub async fn update_agent(
    db: &Database,
    id: &AgentId,
    update: &AgentUpdate,
) -> Result<Agent, LeadflowError> {
    let id_str = id.to_string();
    let name = present(&update.name);
    let email = present(&update.email);
    let mobile_number = present(&update.mobile_number);
    let country_code = present(&update.country_code);

    let outcome = db
        .connection()
        .call(move |conn| -> Result<UpdateOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;
            let existing = tx
                .query_row(
                    &format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = ?1"),
                    params![id_str],
                    agent_from_row,
                )
                .optional()?;
            let Some(mut agent) = existing else {
                return Ok(UpdateOutcome::Missing);
            };

            if let Some(name) = name {
                agent.name = name;
            }
            if let Some(email) = email {
                agent.email = email;
            }
            if let Some(mobile_number) = mobile_number {
                agent.mobile_number = mobile_number;
            }
            if let Some(country_code) = country_code {
                agent.country_code = country_code;
            }
            agent.updated_at = now_timestamp();

            let result = tx.execute(
                "UPDATE agents
                 SET name = ?2, email = ?3, mobile_number = ?4, country_code = ?5, updated_at = ?6
                 WHERE id = ?1",
                params![
                    agent.id.as_str(),
                    agent.name,
                    agent.email,
                    agent.mobile_number,
                    agent.country_code,
                    agent.updated_at,
                ],
            );
            match result {
                Ok(_) => {
                    tx.commit()?;
                    Ok(UpdateOutcome::Updated(agent))
                }
                Err(e) if is_unique_violation(&e) => Ok(UpdateOutcome::EmailTaken(agent.email)),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        UpdateOutcome::Updated(agent) => Ok(agent),
        UpdateOutcome::Missing => Err(LeadflowError::NotFound {
            entity: "agent",
            id: id.to_string(),
        }),
        UpdateOutcome::EmailTaken(email) => Err(email_taken(&email)),
    }
}

/// Delete an agent. Its assignments go with it. Returns `false` if it did not exist.
pub async fn delete_agent(db: &Database, id: &AgentId) -> Result<bool, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let deleted = conn.execute("DELETE FROM agents WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_agent(name: &str, email: &str) -> NewAgent {
        NewAgent {
            name: name.to_string(),
            email: email.to_string(),
            mobile_number: "5550100".to_string(),
            country_code: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_country_code() {
        let db = Database::open_in_memory().await.unwrap();
        let agent = create_agent(&db, &new_agent("Ada", "ada@example.com"))
            .await
            .unwrap();
        assert_eq!(agent.country_code, DEFAULT_COUNTRY_CODE);

        let stored = get_agent(&db, &agent.id).await.unwrap().unwrap();
        assert_eq!(stored, agent);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        create_agent(&db, &new_agent("Ada", "ada@example.com"))
            .await
            .unwrap();
        let err = create_agent(&db, &new_agent("Other", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeadflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn blank_required_field_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let err = create_agent(&db, &new_agent("  ", "x@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeadflowError::InvalidInput(ref m) if m.contains("name")));
    }

    #[tokio::test]
    async fn snapshot_is_creation_order_and_list_is_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        for (name, email) in [("A", "a@x.io"), ("B", "b@x.io"), ("C", "c@x.io")] {
            create_agent(&db, &new_agent(name, email)).await.unwrap();
        }

        let snap: Vec<_> = snapshot(&db).await.unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(snap, vec!["A", "B", "C"]);
        let listed: Vec<_> = list_agents(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(listed, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let db = Database::open_in_memory().await.unwrap();
        let agent = create_agent(&db, &new_agent("Ada", "ada@example.com"))
            .await
            .unwrap();

        let update = AgentUpdate {
            name: Some("Ada L.".into()),
            email: Some("   ".into()),
            ..Default::default()
        };
        let updated = update_agent(&db, &agent.id, &update).await.unwrap();
        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.mobile_number, agent.mobile_number);
    }

    #[tokio::test]
    async fn update_missing_agent_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let err = update_agent(&db, &AgentId::from("ghost"), &AgentUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LeadflowError::NotFound { entity: "agent", .. }));
    }

    #[tokio::test]
    async fn update_to_taken_email_is_a_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        create_agent(&db, &new_agent("Ada", "ada@example.com"))
            .await
            .unwrap();
        let bob = create_agent(&db, &new_agent("Bob", "bob@example.com"))
            .await
            .unwrap();

        let update = AgentUpdate {
            email: Some("ada@example.com".into()),
            ..Default::default()
        };
        let err = update_agent(&db, &bob.id, &update).await.unwrap_err();
        assert!(matches!(err, LeadflowError::Conflict(_)));

        let unchanged = get_agent(&db, &bob.id).await.unwrap().unwrap();
        assert_eq!(unchanged.email, "bob@example.com");
    }

    #[tokio::test]
    async fn delete_reports_whether_agent_existed() {
        let db = Database::open_in_memory().await.unwrap();
        let agent = create_agent(&db, &new_agent("Ada", "ada@example.com"))
            .await
            .unwrap();
        assert!(delete_agent(&db, &agent.id).await.unwrap());
        assert!(!delete_agent(&db, &agent.id).await.unwrap());
    }
}
