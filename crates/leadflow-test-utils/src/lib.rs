// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadflow integration tests.
//!
//! Provides a temp-database harness, input fixtures, and a storage double
//! that fails on demand, for fast, deterministic tests.
//!
//! # Components
//!
//! - [`TestHarness`] - SQLite-backed distributor with seeded agents
//! - [`FailingAssignments`] - assignment store that rejects writes

pub mod fixtures;
pub mod harness;
pub mod mock_store;

pub use harness::TestHarness;
pub use mock_store::FailingAssignments;
