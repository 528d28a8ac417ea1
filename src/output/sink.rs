//! Artifact sink: where harvested sources end up
//!
//! The filesystem sink lays files out as
//! `<root>/<problem>/<status>/<id>.<ext>`, with the status label reduced to
//! lowercase ASCII alphanumerics.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Directory used when a status label has no usable characters
const UNKNOWN_STATUS_DIR: &str = "unknown";

/// Errors raised while writing an artifact
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact: {0}")]
    Invalid(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// The fetched and classified content of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Verdict label, e.g. "Correct Answer"
    pub status: String,

    /// Numeric submission id
    pub identifier: String,

    /// Language label as shown on the solution page
    pub language: String,

    /// File extension derived from `language`
    pub extension: String,

    /// Submitted source
    pub content: String,
}

/// Destination for harvested artifacts
pub trait ArtifactSink: Send + Sync {
    /// Stores `artifact`, returning where it went
    fn persist(&self, artifact: &Artifact) -> SinkResult<PathBuf>;
}

/// Reduces a status label to a directory name
pub fn sanitize_status(status: &str) -> String {
    let cleaned: String = status
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if cleaned.is_empty() {
        UNKNOWN_STATUS_DIR.to_string()
    } else {
        cleaned
    }
}

/// Writes artifacts below a root directory, one file per submission
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    root: PathBuf,
    problem_id: String,
}

impl FsArtifactSink {
    pub fn new(root: &Path, problem_id: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            problem_id: problem_id.to_string(),
        }
    }

    /// Where `artifact` will be written
    pub fn path_for(&self, artifact: &Artifact) -> PathBuf {
        self.root
            .join(&self.problem_id)
            .join(sanitize_status(&artifact.status))
            .join(format!("{}.{}", artifact.identifier, artifact.extension))
    }
}

impl ArtifactSink for FsArtifactSink {
    fn persist(&self, artifact: &Artifact) -> SinkResult<PathBuf> {
        if artifact.identifier.is_empty()
            || !artifact.identifier.chars().all(|c| c.is_ascii_digit())
        {
            return Err(SinkError::Invalid(format!(
                "submission id '{}' is not numeric",
                artifact.identifier
            )));
        }

        let target = self.path_for(artifact);
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        let io_err = |source: std::io::Error| SinkError::Io {
            path: target.clone(),
            source,
        };

        fs::create_dir_all(&dir).map_err(io_err)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(artifact.content.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&target).map_err(|e| io_err(e.error))?;

        tracing::info!("Saved {}", target.display());
        Ok(target)
    }
}
