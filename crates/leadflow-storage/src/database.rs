// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: PRAGMA setup, WAL mode, migrations.
//!
//! All statements run on `tokio-rusqlite`'s single background thread, one
//! closure at a time. That serialization plus the schema's UNIQUE constraints
//! is the whole concurrency story; do not open extra connections for writes.

use std::path::Path;
use std::time::Duration;

use leadflow_core::LeadflowError;
use tracing::debug;

/// Handle to the single SQLite writer connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, LeadflowError> {
        Self::open_with(path, true).await
    }

    /// Open the database at `path`, choosing the journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, LeadflowError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(LeadflowError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(LeadflowError::storage)?;
        let db = Self { conn };
        db.configure(wal_mode).await?;
        db.migrate().await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, LeadflowError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(LeadflowError::storage)?;
        let db = Self { conn };
        db.configure(false).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), LeadflowError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(LeadflowError::storage)
    }

    /// Fold the WAL back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), LeadflowError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn configure(&self, wal_mode: bool) -> Result<(), LeadflowError> {
        self.conn
            .call(move |conn| {
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(Duration::from_secs(5))?;
                if wal_mode {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                    debug!(journal_mode = %mode, "journal mode set");
                }
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn migrate(&self) -> Result<(), LeadflowError> {
        self.conn
            .call(|conn| Ok::<_, rusqlite::Error>(crate::migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)?
    }
}

/// Convert a tokio-rusqlite error into [`LeadflowError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> LeadflowError {
    LeadflowError::Storage {
        source: Box::new(e),
    }
}

/// `true` when `err` is a UNIQUE or PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}
