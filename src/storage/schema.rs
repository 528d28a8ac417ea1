//! Database schema definitions
//!
//! This module contains the SQL schema for the SQLite checkpoint backend.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per checkpoint document, replaced wholesale on save
CREATE TABLE IF NOT EXISTS checkpoints (
    key TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
