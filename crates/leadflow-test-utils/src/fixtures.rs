// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small builders for test inputs.

use serde_json::Value;

use leadflow_core::RawRow;
use leadflow_core::types::NewAgent;

/// A raw upload row with the canonical `FirstName`/`Phone` headers.
pub fn raw_row(first_name: &str, phone: &str) -> RawRow {
    let mut row = RawRow::new();
    row.insert("FirstName".into(), Value::String(first_name.to_string()));
    row.insert("Phone".into(), Value::String(phone.to_string()));
    row
}

/// A new agent whose email is derived from `name`.
pub fn new_agent(name: &str) -> NewAgent {
    let slug = name.to_lowercase().replace(' ', "-");
    NewAgent {
        name: name.to_string(),
        email: format!("{slug}@example.com"),
        mobile_number: "5550100".to_string(),
        country_code: None,
    }
}
