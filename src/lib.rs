//! Solution-Spider: a resumable two-phase submission harvester
//!
//! This crate walks a paginated submission listing to build an append-only
//! link log, then fetches, classifies and stores the source behind every
//! link. Progress is checkpointed after each unit of work so an interrupted
//! run can be restarted without losing or duplicating work.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Solution-Spider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page client error: {0}")]
    Browse(#[from] crawler::BrowseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Artifact sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Invalid submission link: {0}")]
    InvalidLink(String),

    #[error("Discovery failed on listing page {page}: {source}")]
    PageFailed {
        page: u32,
        #[source]
        source: Box<SpiderError>,
    },

    #[error("Processing failed for {link} (log position {position}): {source}")]
    ItemFailed {
        link: String,
        position: usize,
        #[source]
        source: Box<SpiderError>,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Solution-Spider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{harvest, HarvestOptions, HarvestReport};
pub use state::{PaginationCheckpoint, ProcessingLedger};
