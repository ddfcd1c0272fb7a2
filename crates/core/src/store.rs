// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed record store for the offline queue.
//!
//! Each [`EntityKind`] has its own partition (table) with an autoincrement
//! key, so ids are monotonic and never reused. Every partition carries an
//! index on `sync_status`; pending scans and purges go through it.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::record::{EntityKind, Payload, Record, SyncStatus};

/// SQL schema for the record store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    sync_status TEXT NOT NULL DEFAULT 'pending'
        CHECK (sync_status IN ('pending', 'synced')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS investments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    sync_status TEXT NOT NULL DEFAULT 'pending'
        CHECK (sync_status IN ('pending', 'synced')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS balance_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    sync_status TEXT NOT NULL DEFAULT 'pending'
        CHECK (sync_status IN ('pending', 'synced')),
    created_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_transactions_sync_status ON transactions(sync_status);
CREATE INDEX IF NOT EXISTS idx_transactions_created_at ON transactions(created_at);
CREATE INDEX IF NOT EXISTS idx_investments_sync_status ON investments(sync_status);
CREATE INDEX IF NOT EXISTS idx_investments_created_at ON investments(created_at);
CREATE INDEX IF NOT EXISTS idx_balance_items_sync_status ON balance_items(sync_status);
CREATE INDEX IF NOT EXISTS idx_balance_items_created_at ON balance_items(created_at);
"#;

fn conversion_error(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value
        .parse()
        .map_err(|_| conversion_error(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| conversion_error(format!("invalid timestamp '{value}' in column 'created_at'")))
}

/// Parse a stored JSON payload.
fn parse_payload(value: &str) -> std::result::Result<Payload, rusqlite::Error> {
    serde_json::from_str(value)
        .map_err(|e| conversion_error(format!("invalid payload in column 'payload': {e}")))
}

fn row_to_record(kind: EntityKind, row: &rusqlite::Row) -> rusqlite::Result<Record> {
    let payload_str: String = row.get(1)?;
    let status_str: String = row.get(2)?;
    let created_str: String = row.get(3)?;

    Ok(Record {
        id: row.get(0)?,
        kind,
        payload: parse_payload(&payload_str)?,
        sync_status: parse_db(&status_str, "sync_status")?,
        created_at: parse_timestamp(&created_str)?,
    })
}

/// Local persistent store of queued records.
pub struct RecordStore {
    conn: Connection,
    clock: Box<dyn Clock>,
}

impl RecordStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Self::init(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(RecordStore {
            conn,
            clock: Box::new(SystemClock),
        })
    }

    /// Replace the clock used to stamp new records.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Append a new pending record and return its id.
    pub fn enqueue(&self, kind: EntityKind, payload: &Payload) -> Result<i64> {
        let json = serde_json::to_string(payload)?;
        let created_at = self.clock.now().to_rfc3339();
        self.conn.execute(
            &format!(
                "INSERT INTO {} (payload, sync_status, created_at) VALUES (?1, ?2, ?3)",
                kind.table()
            ),
            params![json, SyncStatus::Pending.as_str(), created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a record by id, or `None` if it does not exist.
    pub fn get(&self, kind: EntityKind, id: i64) -> Result<Option<Record>> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, payload, sync_status, created_at FROM {} WHERE id = ?1",
                    kind.table()
                ),
                params![id],
                |row| row_to_record(kind, row),
            )
            .optional()?;
        Ok(record)
    }

    fn list_by_status(&self, kind: EntityKind, status: SyncStatus) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, payload, sync_status, created_at FROM {}
             WHERE sync_status = ?1 ORDER BY id",
            kind.table()
        ))?;
        let records = stmt
            .query_map(params![status.as_str()], |row| row_to_record(kind, row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// All pending records of a kind, in id order.
    pub fn list_pending(&self, kind: EntityKind) -> Result<Vec<Record>> {
        self.list_by_status(kind, SyncStatus::Pending)
    }

    /// All records of a kind regardless of status, in id order.
    pub fn list_all(&self, kind: EntityKind) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, payload, sync_status, created_at FROM {} ORDER BY id",
            kind.table()
        ))?;
        let records = stmt
            .query_map([], |row| row_to_record(kind, row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Number of pending records of one kind.
    pub fn count_pending_kind(&self, kind: EntityKind) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE sync_status = ?1",
                kind.table()
            ),
            params![SyncStatus::Pending.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Number of pending records across all kinds.
    ///
    /// Only used for status reporting, never for correctness decisions.
    pub fn count_pending(&self) -> Result<usize> {
        let mut total = 0;
        for kind in EntityKind::ALL {
            total += self.count_pending_kind(kind)?;
        }
        Ok(total)
    }

    /// Mark a record as acknowledged by the remote.
    ///
    /// Idempotent: a record that is already synced or no longer exists is a
    /// successful no-op. Returns true if a row changed.
    pub fn mark_synced(&self, kind: EntityKind, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET sync_status = ?1 WHERE id = ?2 AND sync_status = ?3",
                kind.table()
            ),
            params![
                SyncStatus::Synced.as_str(),
                id,
                SyncStatus::Pending.as_str()
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete every synced record of a kind and return how many were removed.
    ///
    /// Scoped to rows whose status is `synced` when the statement runs;
    /// pending rows are never touched.
    pub fn purge_synced(&self, kind: EntityKind) -> Result<usize> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE sync_status = ?1", kind.table()),
            params![SyncStatus::Synced.as_str()],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
