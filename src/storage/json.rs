//! JSON file checkpoint backend
//!
//! Each document lives in `<state-dir>/<key>.json`. Writes go to a temp file
//! in the same directory and are renamed over the target, so a crash leaves
//! either the old or the new document, never a torn one.

use crate::storage::traits::{CheckpointKey, CheckpointStore, StorageError, StorageResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File-per-document checkpoint store
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (creating if needed) a store rooted at `dir`
    pub fn new(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: CheckpointKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl CheckpointStore for JsonFileStore {
    fn read(&self, key: CheckpointKey) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: CheckpointKey, document: &str) -> StorageResult<()> {
        let target = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(document.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target)
            .map_err(|e| StorageError::Persist(format!("{}: {}", target.display(), e.error)))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json files in {}", self.dir.display())
    }
}
