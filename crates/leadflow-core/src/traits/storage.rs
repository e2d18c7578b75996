// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter lifecycle trait.

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::traits::adapter::PluginAdapter;

/// Lifecycle for persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (connection, migrations).
    async fn initialize(&self) -> Result<(), LeadflowError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), LeadflowError>;
}
