// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadflow - lead intake and round-robin distribution.
//!
//! This is the binary entry point: the HTTP service (`serve`) plus operator
//! commands that work directly against the configured database.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadflow_config::LeadflowConfig;
use leadflow_core::LeadflowError;

/// Leadflow - lead intake and round-robin distribution.
#[derive(Parser, Debug)]
#[command(name = "leadflow", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Validate, store, and distribute the leads in a CSV file.
    Distribute {
        /// CSV file with a header row (FirstName, Phone, Notes, ...).
        file: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Distribute the unassigned leads of an earlier batch.
    AssignBatch {
        /// Batch ID reported by a previous distribution.
        batch_id: String,
    },
    /// Manage agents.
    Agent {
        #[command(subcommand)]
        action: AgentCommands,
    },
    /// Manage API credentials.
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },
}

/// Agent subcommands.
#[derive(Subcommand, Debug)]
enum AgentCommands {
    /// Register a new agent.
    Add {
        name: String,
        email: String,
        mobile_number: String,
        /// Dialing prefix; defaults to +1.
        #[arg(long)]
        country_code: Option<String>,
    },
    /// List agents, newest first.
    List {
        /// Print the list as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove an agent. Its leads become unassigned.
    Remove { id: String },
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
enum TokenCommands {
    /// Print a signed API token for an existing agent.
    Issue { agent_id: String },
}

fn load_config(path: Option<&std::path::Path>) -> LeadflowConfig {
    let loaded = match path {
        Some(path) => leadflow_config::load_and_validate_path(path),
        None => leadflow_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadflow_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Distribute { file, json }) => {
            commands::run_distribute(&config, &file, json).await
        }
        Some(Commands::AssignBatch { batch_id }) => {
            commands::run_assign_batch(&config, &batch_id).await
        }
        Some(Commands::Agent { action }) => match action {
            AgentCommands::Add {
                name,
                email,
                mobile_number,
                country_code,
            } => {
                commands::run_agent_add(&config, name, email, mobile_number, country_code).await
            }
            AgentCommands::List { json } => commands::run_agent_list(&config, json).await,
            AgentCommands::Remove { id } => commands::run_agent_remove(&config, &id).await,
        },
        Some(Commands::Token { action }) => match action {
            TokenCommands::Issue { agent_id } => {
                commands::run_token_issue(&config, &agent_id).await
            }
        },
        None => {
            println!("leadflow: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(exit_code(&e));
    }
}

/// Exit status for a failed command: 2 for rejected input, 1 for everything else.
fn exit_code(err: &LeadflowError) -> i32 {
    if err.is_input_error() { 2 } else { 1 }
}
