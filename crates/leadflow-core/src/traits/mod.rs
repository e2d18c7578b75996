// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the distribution pipeline and its storage backends.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility, so the
//! orchestrator can hold `Arc<dyn LeadStore>` and friends.

pub mod adapter;
pub mod agents;
pub mod assignments;
pub mod leads;
pub mod storage;

pub use adapter::PluginAdapter;
pub use agents::{AgentDirectory, AgentPool};
pub use assignments::AssignmentStore;
pub use leads::LeadStore;
pub use storage::StorageAdapter;
