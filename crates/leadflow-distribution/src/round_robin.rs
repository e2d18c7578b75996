// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Round-robin pairing of leads with agents.

use leadflow_core::LeadflowError;
use leadflow_core::types::{Agent, AssignmentPlan, Lead};

/// Rotating cursor over a fixed agent list.
///
/// The cursor lives only as long as one call; every run starts at the
/// first agent again.
#[derive(Debug)]
pub struct RoundRobin<'a> {
    agents: &'a [Agent],
    cursor: usize,
}

impl<'a> RoundRobin<'a> {
    /// Start a rotation at the first agent. Fails on an empty list.
    pub fn new(agents: &'a [Agent]) -> Result<Self, LeadflowError> {
        if agents.is_empty() {
            return Err(LeadflowError::EmptyAgentPool);
        }
        Ok(Self { agents, cursor: 0 })
    }

    /// The agent for the next lead.
    pub fn next_agent(&mut self) -> &'a Agent {
        let agent = &self.agents[self.cursor % self.agents.len()];
        self.cursor += 1;
        agent
    }
}

/// Pair `leads[i]` with `agents[i % agents.len()]`.
///
/// Pure and deterministic: the same inputs always yield the same pairs,
/// in lead order.
pub fn assign(leads: &[Lead], agents: &[Agent]) -> Result<Vec<AssignmentPlan>, LeadflowError> {
    let mut rotation = RoundRobin::new(agents)?;
    Ok(leads
        .iter()
        .map(|lead| AssignmentPlan {
            lead_id: lead.id.clone(),
            agent_id: rotation.next_agent().id.clone(),
        })
        .collect())
}
