//! SQLite checkpoint backend
//!
//! This module provides a SQLite-based implementation of the CheckpointStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CheckpointKey, CheckpointStore, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Every checkpoint save must be durable before the next unit of work
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// When `key` was last saved (RFC 3339)
    pub fn updated_at(&self, key: CheckpointKey) -> StorageResult<Option<String>> {
        let updated = self
            .conn
            .query_row(
                "SELECT updated_at FROM checkpoints WHERE key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated)
    }
}

impl CheckpointStore for SqliteStore {
    fn read(&self, key: CheckpointKey) -> StorageResult<Option<String>> {
        let document = self
            .conn
            .query_row(
                "SELECT document FROM checkpoints WHERE key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(document)
    }

    fn write(&self, key: CheckpointKey, document: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO checkpoints (key, document, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at",
            params![key.as_str(), document, now],
        )?;
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite database {}", path.display()),
            None => "in-memory sqlite database".to_string(),
        }
    }
}
