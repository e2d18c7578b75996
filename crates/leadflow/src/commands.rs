// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands that run directly against the configured database.
//!
//! With stdout not a TTY (or `NO_COLOR` set) output is plain.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use leadflow_config::model::LeadflowConfig;
use leadflow_core::types::{DistributionSummary, NewAgent};
use leadflow_core::{AgentDirectory, AgentId, BatchId, LeadflowError, StorageAdapter};
use leadflow_distribution::{Distributor, parse_csv};
use leadflow_gateway::mint_token;
use leadflow_storage::SqliteStorage;
use tracing::warn;

async fn open_storage(config: &LeadflowConfig) -> Result<Arc<SqliteStorage>, LeadflowError> {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    Ok(Arc::new(SqliteStorage::open(config.storage.clone()).await?))
}

/// Keep the command's own outcome when closing the database fails afterwards.
fn settle<T>(
    result: Result<T, LeadflowError>,
    closed: Result<(), LeadflowError>,
) -> Result<T, LeadflowError> {
    if let Err(e) = closed {
        warn!(error = %e, "storage close failed");
        eprintln!("{} closing the database failed: {e}", "!".yellow());
    }
    result
}

fn distributor(storage: &Arc<SqliteStorage>) -> Distributor {
    Distributor::new(storage.clone(), storage.clone(), storage.clone())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, LeadflowError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| LeadflowError::Internal(format!("failed to encode output: {e}")))
}

fn print_summary(summary: &DistributionSummary) {
    let message = summary.message();
    if summary.is_complete() {
        println!("{}", message.green());
    } else {
        println!("{}", message.yellow());
    }
    println!("  batch:       {}", summary.batch_id);
    println!(
        "  leads:       {} of {} stored",
        summary.leads_created, summary.leads_requested
    );
    println!("  assignments: {}", summary.assignments_created);
    if let Some(failure) = &summary.lead_failure {
        println!(
            "  {} row {} was not stored: {}",
            "✗".red(),
            failure.index,
            failure.reason
        );
    }
    for rejected in &summary.rejected_assignments {
        println!(
            "  {} lead {} -> agent {} ({}): {}",
            "✗".red(),
            rejected.lead_id,
            rejected.agent_id,
            rejected.kind,
            rejected.reason
        );
    }
}

/// Run `leadflow distribute <file>`.
pub async fn run_distribute(
    config: &LeadflowConfig,
    file: &Path,
    json: bool,
) -> Result<(), LeadflowError> {
    let reader = std::fs::File::open(file).map_err(|e| {
        LeadflowError::InvalidInput(format!("cannot read {}: {e}", file.display()))
    })?;
    let rows = parse_csv(reader)?;

    let storage = open_storage(config).await?;
    let result = distributor(&storage).distribute(&rows).await;
    let result = settle(result, storage.close().await);

    let summary = match result {
        Ok(summary) => summary,
        Err(LeadflowError::NoAgentsAvailable {
            batch_id,
            leads_created,
            lead_failure,
        }) => {
            eprintln!(
                "{} stored {leads_created} leads but no agents are registered.",
                "!".yellow()
            );
            if let Some(failure) = &lead_failure {
                eprintln!(
                    "  {} row {} was not stored: {}",
                    "✗".red(),
                    failure.index,
                    failure.reason
                );
            }
            eprintln!("  add agents, then run: leadflow assign-batch {batch_id}");
            return Err(LeadflowError::NoAgentsAvailable {
                batch_id,
                leads_created,
                lead_failure,
            });
        }
        Err(e) => return Err(e),
    };

    if json {
        println!("{}", to_json(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Run `leadflow assign-batch <batch_id>`.
pub async fn run_assign_batch(config: &LeadflowConfig, batch_id: &str) -> Result<(), LeadflowError> {
    let storage = open_storage(config).await?;
    let result = distributor(&storage)
        .assign_batch(&BatchId::from(batch_id))
        .await;
    let result = settle(result, storage.close().await);

    print_summary(&result?);
    Ok(())
}

/// Run `leadflow agent add`.
pub async fn run_agent_add(
    config: &LeadflowConfig,
    name: String,
    email: String,
    mobile_number: String,
    country_code: Option<String>,
) -> Result<(), LeadflowError> {
    let storage = open_storage(config).await?;
    let result = storage
        .create_agent(&NewAgent {
            name,
            email,
            mobile_number,
            country_code,
        })
        .await;
    let result = settle(result, storage.close().await);

    let agent = result?;
    println!("{} agent {} ({})", "✓".green(), agent.name, agent.id);
    Ok(())
}

/// Run `leadflow agent list`.
pub async fn run_agent_list(config: &LeadflowConfig, json: bool) -> Result<(), LeadflowError> {
    let storage = open_storage(config).await?;
    let result = storage.list_agents().await;
    let result = settle(result, storage.close().await);

    let agents = result?;
    if json {
        println!("{}", to_json(&agents)?);
        return Ok(());
    }
    if agents.is_empty() {
        println!("no agents registered");
        return Ok(());
    }
    for agent in &agents {
        println!(
            "{}  {:<20} {:<28} {} {}",
            agent.id.to_string().dimmed(),
            agent.name.bold(),
            agent.email,
            agent.country_code,
            agent.mobile_number
        );
    }
    Ok(())
}

/// Run `leadflow agent remove <id>`.
pub async fn run_agent_remove(config: &LeadflowConfig, id: &str) -> Result<(), LeadflowError> {
    let storage = open_storage(config).await?;
    let id = AgentId::from(id);
    let result = storage.delete_agent(&id).await;
    let result = settle(result, storage.close().await);

    if !result? {
        return Err(LeadflowError::NotFound {
            entity: "agent",
            id: id.to_string(),
        });
    }
    println!("{} removed agent {id}", "✓".green());
    Ok(())
}

/// Run `leadflow token issue <agent_id>`.
pub async fn run_token_issue(config: &LeadflowConfig, agent_id: &str) -> Result<(), LeadflowError> {
    let secret = config.gateway.token_secret.as_deref().ok_or_else(|| {
        LeadflowError::Config("gateway.token_secret must be set to issue agent tokens".into())
    })?;

    let storage = open_storage(config).await?;
    let id = AgentId::from(agent_id);
    let result = storage.get_agent(&id).await;
    let result = settle(result, storage.close().await);

    if result?.is_none() {
        return Err(LeadflowError::NotFound {
            entity: "agent",
            id: id.to_string(),
        });
    }
    println!("{}", mint_token(secret, &id));
    Ok(())
}
