//! Storage module for persisting harvest progress
//!
//! This module handles:
//! - Checkpoint backends (JSON files or SQLite) behind one trait
//! - Typed, fail-soft loading and whole-document saving of checkpoints
//! - The append-only link log shared by both phases

mod json;
mod link_log;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonFileStore;
pub use link_log::{LinkLog, LINK_LOG_FILE};
pub use sqlite::SqliteStore;
pub use traits::{CheckpointKey, CheckpointStore, StorageError, StorageResult};

use crate::config::{StateBackend, StateConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// File name of the SQLite backend inside the state directory
pub const SQLITE_FILE: &str = "checkpoints.db";

/// Opens the checkpoint backend selected in the configuration
pub fn open_store(config: &StateConfig) -> StorageResult<Box<dyn CheckpointStore>> {
    match config.backend {
        StateBackend::Json => Ok(Box::new(JsonFileStore::new(&config.directory)?)),
        StateBackend::Sqlite => Ok(Box::new(SqliteStore::new(
            &config.directory.join(SQLITE_FILE),
        )?)),
    }
}

/// Loads the document under `key`, falling back to `default`
///
/// Never fails: a missing, unreadable or malformed document yields the
/// default, and the latter two are logged.
pub fn load_or<T, F>(store: &dyn CheckpointStore, key: CheckpointKey, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match store.read(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Malformed {} checkpoint, starting from default: {}", key, e);
                default()
            }
        },
        Ok(None) => {
            tracing::debug!("No {} checkpoint in {}", key, store.describe());
            default()
        }
        Err(e) => {
            tracing::warn!("Unreadable {} checkpoint, starting from default: {}", key, e);
            default()
        }
    }
}

/// Serializes `document` and replaces whatever is stored under `key`
pub fn save<T: Serialize>(
    store: &dyn CheckpointStore,
    key: CheckpointKey,
    document: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string_pretty(document)?;
    store.write(key, &raw)?;
    tracing::trace!("Saved {} checkpoint", key);
    Ok(())
}
