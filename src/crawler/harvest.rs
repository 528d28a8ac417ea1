//! Two-phase harvest orchestration
//!
//! Decides whether discovery runs, then hands the link log to processing.
//! Either phase aborts the harvest on its first failure; the checkpoints
//! left behind let the next invocation continue where this one stopped.

use crate::config::Config;
use crate::crawler::client::PageClient;
use crate::crawler::discovery::{DiscoveryEngine, DiscoveryReport, DiscoverySettings};
use crate::crawler::http_client::HttpPageClient;
use crate::crawler::processing::{ProcessingEngine, ProcessingReport, ProcessingSettings};
use crate::output::{ArtifactSink, FsArtifactSink};
use crate::storage::{self, CheckpointStore, LinkLog};
use crate::SpiderError;

/// How the harvest treats the discovery phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestOptions {
    /// Skip discovery even when no link log exists
    pub resume: bool,

    /// Run discovery even when the link log exists
    pub force_discovery: bool,
}

/// Combined outcome of both phases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// None when discovery was skipped
    pub discovery: Option<DiscoveryReport>,
    pub processing: ProcessingReport,
}

/// Whether the discovery phase runs for these options and log state
pub fn should_discover(options: HarvestOptions, log_exists: bool) -> bool {
    options.force_discovery || (!options.resume && !log_exists)
}

/// Runs both phases against explicit collaborators
pub async fn run_harvest(
    config: &Config,
    options: HarvestOptions,
    client: &dyn PageClient,
    store: &dyn CheckpointStore,
    log: &LinkLog,
    sink: &dyn ArtifactSink,
) -> Result<HarvestReport, SpiderError> {
    let discovery = if should_discover(options, log.exists()) {
        tracing::info!("Phase 1: discovering submission links");
        let engine = DiscoveryEngine::new(DiscoverySettings::from_config(config)?, store, log);
        Some(engine.run(client).await?)
    } else {
        tracing::info!(
            "Phase 1 skipped ({})",
            if log.exists() {
                "link log present"
            } else {
                "--resume given"
            }
        );
        None
    };

    tracing::info!("Phase 2: processing logged links");
    let engine = ProcessingEngine::new(ProcessingSettings::from_config(config), store, log, sink);
    let processing = engine.run(client).await?;

    Ok(HarvestReport {
        discovery,
        processing,
    })
}

/// Runs a complete harvest with the configured HTTP client and backends
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `options` - Phase selection from the command line
///
/// # Returns
///
/// * `Ok(HarvestReport)` - Both phases finished
/// * `Err(SpiderError)` - A page or item failed; checkpoints hold the resume point
pub async fn harvest(config: &Config, options: HarvestOptions) -> Result<HarvestReport, SpiderError> {
    let client = HttpPageClient::new(&config.client)?;
    let store = storage::open_store(&config.state)?;
    let log = LinkLog::in_dir(&config.state.directory);
    let sink = FsArtifactSink::new(&config.output.solutions_directory, &config.target.problem_id);

    tracing::info!("Checkpoints: {}", store.describe());
    tracing::info!("Link log: {}", log.path().display());

    run_harvest(config, options, &client, store.as_ref(), &log, &sink).await
}
