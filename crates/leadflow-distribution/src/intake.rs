// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV upload intake.

use std::io::Read;

use serde_json::Value;

use leadflow_core::{LeadflowError, RawRow};

/// Decode a CSV document into raw rows keyed by header name.
///
/// The first record is the header row. Every cell is kept as a string;
/// normalization is left to [`validate`](crate::validator::validate).
/// Blank lines are skipped and a record with a different field count than
/// the header is an error.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawRow>, LeadflowError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv
        .headers()
        .map_err(|e| LeadflowError::InvalidInput(format!("malformed CSV header: {e}")))?
        .clone();
    if headers.iter().all(str::is_empty) {
        return Err(LeadflowError::InvalidInput(
            "CSV upload has no header row".into(),
        ));
    }

    let mut rows = Vec::new();
    for record in csv.records() {
        let record =
            record.map_err(|e| LeadflowError::InvalidInput(format!("malformed CSV: {e}")))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(row);
    }
    tracing::debug!(rows = rows.len(), "parsed CSV upload");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;

    #[test]
    fn rows_are_keyed_by_header() {
        let data = "FirstName,Phone,Notes\nAnn,555,hot\nBo,777,\n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["FirstName"], "Ann");
        assert_eq!(rows[1]["Notes"], "");
    }

    #[test]
    fn parsed_rows_feed_the_validator() {
        let data = " first_name , phone \nAnn,555\n\nBo,777\n";
        let candidates = validate(&parse_csv(data.as_bytes()).unwrap()).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].first_name, "Bo");
    }

    #[test]
    fn ragged_record_is_rejected() {
        let data = "FirstName,Phone\nAnn,555,extra\n";
        let err = parse_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LeadflowError::InvalidInput(_)));
    }

    #[test]
    fn empty_document_yields_no_header_error() {
        let err = parse_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, LeadflowError::InvalidInput(ref m) if m.contains("header")));
    }

    #[test]
    fn header_only_document_yields_no_rows() {
        let rows = parse_csv("FirstName,Phone\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }
}
