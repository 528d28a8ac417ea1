//! Crawler module for the two harvest phases
//!
//! This module contains the core harvesting logic, including:
//! - The page client seam and its reqwest-backed implementation
//! - Site-specific extraction of ids, links and labels
//! - Listing discovery and per-item processing engines
//! - Pacing between requests and overall harvest orchestration

mod classify;
mod client;
mod discovery;
mod extract;
mod harvest;
mod http_client;
mod pacing;
mod processing;

#[cfg(test)]
mod testing;

pub use classify::{language_extension, DEFAULT_EXTENSION};
pub use client::{close_quietly, evaluate, BrowseError, PageClient, PageContext};
pub use discovery::{DiscoveryEngine, DiscoveryReport, DiscoverySettings, StopReason};
pub use extract::{
    extract_submission_ids, has_next_page, plaintext_link, solution_link, submission_id,
};
pub use harvest::{harvest, run_harvest, should_discover, HarvestOptions, HarvestReport};
pub use http_client::{build_http_client, HttpPageClient};
pub use pacing::Pacer;
pub use processing::{ProcessingEngine, ProcessingReport, ProcessingSettings};
