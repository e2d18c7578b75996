// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw row normalization and validation.
//!
//! Spreadsheets arrive with inconsistent header casing, so each field is
//! looked up through an ordered list of accepted header names. The first
//! header carrying a non-blank value wins.

use serde_json::Value;

use leadflow_core::types::LeadCandidate;
use leadflow_core::{LeadflowError, RawRow};

/// Accepted headers for the first name, in lookup order.
pub const FIRST_NAME_KEYS: &[&str] = &["FirstName", "firstName", "firstname", "first_name"];

/// Accepted headers for the phone number, in lookup order.
pub const PHONE_KEYS: &[&str] = &["Phone", "phone"];

/// Accepted headers for free-form notes, in lookup order.
pub const NOTES_KEYS: &[&str] = &["Notes", "notes"];

/// Validate and normalize a whole upload.
///
/// Either every row becomes a [`LeadCandidate`] or the batch is rejected:
/// a single row without a non-blank first name and phone fails the call
/// with [`LeadflowError::InvalidRows`] listing every offending zero-based
/// position. Nothing is written here.
pub fn validate(rows: &[RawRow]) -> Result<Vec<LeadCandidate>, LeadflowError> {
    if rows.is_empty() {
        return Err(LeadflowError::EmptyBatch);
    }

    let mut candidates = Vec::with_capacity(rows.len());
    let mut invalid = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match normalize(row) {
            Some(candidate) => candidates.push(candidate),
            None => invalid.push(index),
        }
    }

    if !invalid.is_empty() {
        return Err(LeadflowError::InvalidRows {
            count: invalid.len(),
            indices: invalid,
        });
    }
    Ok(candidates)
}

/// Normalize one row, or `None` if a required field is missing.
pub fn normalize(row: &RawRow) -> Option<LeadCandidate> {
    let first_name = first_non_blank(row, FIRST_NAME_KEYS)?;
    let phone = first_non_blank(row, PHONE_KEYS)?;
    let notes = NOTES_KEYS
        .iter()
        .filter_map(|key| row.get(*key))
        .filter_map(cell_text)
        .find(|text| !text.trim().is_empty());
    Some(LeadCandidate {
        first_name,
        phone,
        notes,
    })
}

fn first_non_blank(row: &RawRow, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .filter_map(cell_text)
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

/// Render a cell as text. Whole numbers lose the trailing `.0` that
/// spreadsheet decoders attach to numeric phone columns.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{f:.0}")
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
