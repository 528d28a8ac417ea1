//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to replace checkpoint file: {0}")]
    Persist(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The two independent checkpoint documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckpointKey {
    /// Discovery cursor (`PaginationCheckpoint`)
    PageState,

    /// Processing ledger (`ProcessingLedger`)
    ProcessedState,
}

impl CheckpointKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PageState => "page-state",
            Self::ProcessedState => "processed-state",
        }
    }
}

impl std::fmt::Display for CheckpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for checkpoint backend implementations
///
/// Backends store whole documents as opaque strings; typed access and the
/// fail-soft load policy live in [`crate::storage::load_or`] and
/// [`crate::storage::save`].
pub trait CheckpointStore: Send {
    /// Reads the raw document stored under `key`, `None` when nothing was saved yet
    fn read(&self, key: CheckpointKey) -> StorageResult<Option<String>>;

    /// Replaces the document stored under `key`
    fn write(&self, key: CheckpointKey, document: &str) -> StorageResult<()>;

    /// Human-readable location, used in log lines
    fn describe(&self) -> String;
}
