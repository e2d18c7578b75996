// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead ingestion and distribution pipeline.
//!
//! Raw rows flow through [`validator::validate`], are stored as one batch,
//! and are paired with agents by [`round_robin::assign`]. [`Distributor`]
//! runs the whole sequence against the storage traits from `leadflow-core`.

pub mod distributor;
pub mod intake;
pub mod round_robin;
pub mod validator;

pub use distributor::Distributor;
pub use intake::parse_csv;
pub use round_robin::assign;
pub use validator::validate;
