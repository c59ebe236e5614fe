// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relational journal: one table row per event

use crate::journal::Journal;
use crate::transaction_log::TransactionLog;
use kvs_core::{Event, EventKind, LogError};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;
use tracing::info;

/// Default name of the transaction table
pub const DEFAULT_TABLE: &str = "transactions";

/// Transaction log backed by a SQLite table
pub type SqliteTransactionLogger = TransactionLog<SqliteJournal>;

impl TransactionLog<SqliteJournal> {
    /// Open or create the database at `path`, using `table` for events
    pub fn open_sqlite(path: &Path, table: &str) -> Result<Self, LogError> {
        Ok(Self::new(SqliteJournal::open(path, table)?))
    }
}

/// Events stored as typed rows ordered by their sequence column
pub struct SqliteJournal {
    conn: Connection,
    table: String,
    target: String,
}

impl SqliteJournal {
    /// Open a database file, verify it responds, and make sure the table exists
    pub fn open(path: &Path, table: &str) -> Result<Self, LogError> {
        let target = path.display().to_string();
        let open_error = |reason: String| LogError::Open {
            target: target.clone(),
            reason,
        };

        validate_table_name(table).map_err(open_error)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| open_error(e.to_string()))?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| open_error(format!("error connecting to database: {e}")))?;

        Self::with_connection(conn, table, target.clone())
    }

    /// Open a private in-memory database (lost when dropped)
    pub fn open_in_memory(table: &str) -> Result<Self, LogError> {
        let target = format!(":memory:/{table}");
        validate_table_name(table).map_err(|reason| LogError::Open {
            target: target.clone(),
            reason,
        })?;
        let conn = Connection::open_in_memory().map_err(|e| LogError::Open {
            target: target.clone(),
            reason: e.to_string(),
        })?;
        Self::with_connection(conn, table, target)
    }

    fn with_connection(conn: Connection, table: &str, target: String) -> Result<Self, LogError> {
        let journal = Self {
            conn,
            table: table.to_string(),
            target,
        };
        let open_error = |reason: String| LogError::Open {
            target: journal.target.clone(),
            reason,
        };

        journal
            .ping()
            .map_err(|e| open_error(format!("error pinging database: {e}")))?;

        let exists = journal
            .verify_table_exists()
            .map_err(|e| open_error(format!("error verifying table exists: {e}")))?;
        if !exists {
            journal
                .create_table()
                .map_err(|e| open_error(format!("failed to create table: {e}")))?;
            info!(table = %journal.table, "created transaction table");
        }

        info!(location = %journal.target, table = %journal.table, "opened transaction database");
        Ok(journal)
    }

    fn ping(&self) -> rusqlite::Result<()> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
    }

    fn verify_table_exists(&self) -> rusqlite::Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![self.table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create_table(&self) -> rusqlite::Result<()> {
        self.conn.execute(
            &format!(
                "CREATE TABLE {} (
                    sequence INTEGER PRIMARY KEY,
                    event_type INTEGER NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL
                )",
                self.table
            ),
            [],
        )?;
        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Journal for SqliteJournal {
    fn target(&self) -> String {
        format!("{}#{}", self.target, self.table)
    }

    fn append(&mut self, event: &Event) -> Result<(), LogError> {
        let sequence = i64::try_from(event.sequence).map_err(|_| {
            LogError::Database(format!(
                "sequence {} exceeds the column range",
                event.sequence
            ))
        })?;

        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} (sequence, event_type, key, value) VALUES (?1, ?2, ?3, ?4)",
                    self.table
                ),
                params![sequence, event.kind.code(), event.key, event.value],
            )
            .map_err(|e| LogError::Database(e.to_string()))?;
        Ok(())
    }

    fn scan(
        &mut self,
        visit: &mut dyn FnMut(Event) -> Result<(), LogError>,
    ) -> Result<(), LogError> {
        let db_error = |e: rusqlite::Error| LogError::Database(e.to_string());

        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT sequence, event_type, key, value FROM {} ORDER BY sequence",
                self.table
            ))
            .map_err(db_error)?;
        let mut rows = stmt.query([]).map_err(db_error)?;

        let mut number = 0u64;
        while let Some(row) = rows.next().map_err(db_error)? {
            number += 1;
            visit(decode_row(row, number)?)?;
        }
        Ok(())
    }
}

/// Convert one row back into an event
fn decode_row(row: &Row<'_>, record: u64) -> Result<Event, LogError> {
    let parse_error = |reason: String| LogError::Parse { record, reason };
    let column_error = |e: rusqlite::Error| parse_error(e.to_string());

    let sequence: i64 = row.get(0).map_err(column_error)?;
    let code: i64 = row.get(1).map_err(column_error)?;
    let key: String = row.get(2).map_err(column_error)?;
    let value: String = row.get(3).map_err(column_error)?;

    let sequence = u64::try_from(sequence)
        .map_err(|_| parse_error(format!("negative sequence {sequence}")))?;
    let kind = EventKind::from_code(code)
        .ok_or_else(|| parse_error(format!("unknown event type {code}")))?;
    if key.is_empty() {
        return Err(parse_error("empty key".to_string()));
    }

    Ok(Event {
        sequence,
        kind,
        key,
        value,
    })
}

/// Table names are interpolated into SQL, so only plain identifiers pass
fn validate_table_name(table: &str) -> Result<(), String> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("invalid table name {table:?}"))
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
