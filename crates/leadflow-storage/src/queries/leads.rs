// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead batch inserts and lookups.

use leadflow_core::LeadflowError;
use leadflow_core::types::{
    BatchFailure, BatchId, Lead, LeadCandidate, LeadId, PersistedBatch, now_timestamp,
};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::Database;

const LEAD_COLUMNS: &str = "id, first_name, phone, notes, upload_batch_id, created_at";

fn lead_from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: LeadId(row.get(0)?),
        first_name: row.get(1)?,
        phone: row.get(2)?,
        notes: row.get(3)?,
        upload_batch_id: BatchId(row.get(4)?),
        created_at: row.get(5)?,
    })
}

/// Store `candidates` under a fresh batch id, in input order.
///
/// Rows are inserted one at a time with no enclosing transaction, so rows
/// written before a failure stay written. The first failing row stops the
/// batch and is reported in [`PersistedBatch::failure`]; later rows are not
/// attempted.
pub async fn persist_batch(
    db: &Database,
    candidates: &[LeadCandidate],
) -> Result<PersistedBatch, LeadflowError> {
    let batch = BatchId::generate();
    let candidates = candidates.to_vec();
    db.connection()
        .call(move |conn| -> Result<PersistedBatch, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "INSERT INTO leads (id, first_name, phone, notes, upload_batch_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            let mut leads = Vec::with_capacity(candidates.len());
            let mut failure = None;
            for (index, candidate) in candidates.into_iter().enumerate() {
                let lead = Lead {
                    id: LeadId::generate(),
                    first_name: candidate.first_name,
                    phone: candidate.phone,
                    notes: candidate.notes,
                    upload_batch_id: batch.clone(),
                    created_at: now_timestamp(),
                };
                let inserted = stmt.execute(params![
                    lead.id.as_str(),
                    lead.first_name,
                    lead.phone,
                    lead.notes,
                    lead.upload_batch_id.as_str(),
                    lead.created_at,
                ]);
                match inserted {
                    Ok(_) => leads.push(lead),
                    Err(e) => {
                        failure = Some(BatchFailure {
                            index,
                            reason: e.to_string(),
                        });
                        break;
                    }
                }
            }
            Ok(PersistedBatch {
                batch_id: batch,
                leads,
                failure,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All leads, newest first.
pub async fn list_leads(db: &Database) -> Result<Vec<Lead>, LeadflowError> {
    db.connection()
        .call(|conn| -> Result<Vec<Lead>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {LEAD_COLUMNS} FROM leads ORDER BY seq DESC"))?;
            let rows = stmt.query_map([], lead_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a lead by ID.
pub async fn get_lead(db: &Database, id: &LeadId) -> Result<Option<Lead>, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Lead>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
                params![id],
                lead_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a lead and its assignment. Returns `false` if the lead did not exist.
pub async fn delete_lead(db: &Database, id: &LeadId) -> Result<bool, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM assignments WHERE lead_id = ?1", params![id])?;
            let deleted = tx.execute("DELETE FROM leads WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Leads from `batch_id` that have no assignment yet, in insertion order.
pub async fn unassigned_in_batch(
    db: &Database,
    batch_id: &BatchId,
) -> Result<Vec<Lead>, LeadflowError> {
    let batch_id = batch_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Lead>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LEAD_COLUMNS} FROM leads l
                 WHERE l.upload_batch_id = ?1
                   AND NOT EXISTS (SELECT 1 FROM assignments a WHERE a.lead_id = l.id)
                 ORDER BY l.seq ASC"
            ))?;
            let rows = stmt.query_map(params![batch_id], lead_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
