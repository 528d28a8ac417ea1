//! Output module for harvested artifacts and progress reports
//!
//! This module handles:
//! - Writing classified submission sources to their final location
//! - Summarizing checkpoint progress for the operator

mod sink;
pub mod stats;

pub use sink::{sanitize_status, Artifact, ArtifactSink, FsArtifactSink, SinkError, SinkResult};
pub use stats::{load_status, print_status, HarvestStatus};
