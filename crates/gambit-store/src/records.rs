//! CRUD operations for rows in the `records` table.
//!
//! These are the raw, synchronous primitives; [`crate::RecordStore`] wraps
//! them with serde and async access.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;

impl Database {
    // ------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------

    /// Insert or replace the state for `(kind, key)`.
    pub fn put_record(&self, kind: &str, key: &str, state: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO records (kind, key, state, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (kind, key) DO UPDATE
             SET state = excluded.state, updated_at = excluded.updated_at",
            params![kind, key, state, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch the state for `(kind, key)`, if present.
    pub fn get_record(&self, kind: &str, key: &str) -> Result<Option<String>> {
        let state = self
            .conn()
            .query_row(
                "SELECT state FROM records WHERE kind = ?1 AND key = ?2",
                params![kind, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(state)
    }

    /// Whether a record exists for `(kind, key)`.
    pub fn record_exists(&self, kind: &str, key: &str) -> Result<bool> {
        let n: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM records WHERE kind = ?1 AND key = ?2",
            params![kind, key],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    /// List all `(key, state)` pairs of one kind, ordered by key.
    pub fn list_records(&self, kind: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn().prepare(
            "SELECT key, state FROM records WHERE kind = ?1 ORDER BY key ASC",
        )?;

        let rows = stmt.query_map(params![kind], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a record.  Returns `true` if a row was deleted.
    pub fn delete_record(&self, kind: &str, key: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM records WHERE kind = ?1 AND key = ?2",
            params![kind, key],
        )?;
        Ok(affected > 0)
    }
}
