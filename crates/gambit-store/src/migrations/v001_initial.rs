//! v001 -- Initial schema creation.
//!
//! One generic `records` table: every entity is a JSON state blob addressed
//! by `(kind, key)`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    kind       TEXT NOT NULL,      -- entity namespace, e.g. 'player', 'game'
    key        TEXT NOT NULL,      -- entity id within the namespace
    state      TEXT NOT NULL,      -- JSON-serialized record state
    updated_at TEXT NOT NULL,      -- ISO-8601 / RFC-3339

    PRIMARY KEY (kind, key)
);

CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
