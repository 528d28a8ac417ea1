//! Item processing: turns logged links into stored artifacts
//!
//! Walks the link log from the ledger cursor. Each link gets its own page
//! context; the plain-text source is read through a second, short-lived
//! context. The ledger is saved only after the artifact is on disk, so a
//! crash can repeat an item but never lose one.

use crate::config::Config;
use crate::crawler::classify::language_extension;
use crate::crawler::client::{close_quietly, log_redirect, PageClient, PageContext};
use crate::crawler::extract::{plaintext_link, submission_id, LANGUAGE_LABEL, SOURCE_BODY, STATUS_LABEL};
use crate::crawler::pacing::Pacer;
use crate::output::{Artifact, ArtifactSink};
use crate::state::ProcessingLedger;
use crate::storage::{self, CheckpointKey, CheckpointStore, LinkLog};
use crate::SpiderError;
use std::path::PathBuf;
use std::time::Duration;

/// Immutable inputs of a processing run
#[derive(Debug, Clone)]
pub struct ProcessingSettings {
    /// Site root plain-text links are built on
    pub site_root: String,

    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,

    /// Delay after each stored item
    pub pacer: Pacer,
}

impl ProcessingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            site_root: config.target.site_root().to_string(),
            navigation_timeout: config.crawler.navigation_timeout(),
            selector_timeout: config.crawler.selector_timeout(),
            pacer: Pacer::from_millis(config.crawler.item_delay, config.crawler.item_jitter),
        }
    }
}

/// Outcome of a processing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingReport {
    /// Log entries at or after the starting cursor
    pub total: usize,

    /// Items stored during this run
    pub processed: usize,

    /// Entries skipped because their link was already processed
    pub skipped: usize,
}

/// Drives the per-item pipeline over the link log
pub struct ProcessingEngine<'a> {
    settings: ProcessingSettings,
    store: &'a dyn CheckpointStore,
    log: &'a LinkLog,
    sink: &'a dyn ArtifactSink,
}

impl<'a> ProcessingEngine<'a> {
    pub fn new(
        settings: ProcessingSettings,
        store: &'a dyn CheckpointStore,
        log: &'a LinkLog,
        sink: &'a dyn ArtifactSink,
    ) -> Self {
        Self {
            settings,
            store,
            log,
            sink,
        }
    }

    /// Processes every unprocessed link from the ledger cursor onwards
    ///
    /// # Returns
    ///
    /// Counts for the run, or [`SpiderError::ItemFailed`] for the first item
    /// that could not be stored. The ledger then points at that item.
    pub async fn run(&self, client: &dyn PageClient) -> Result<ProcessingReport, SpiderError> {
        if !self.log.exists() {
            tracing::info!("No link log at {}; nothing to process", self.log.path().display());
            return Ok(ProcessingReport::default());
        }

        let links = self.log.read_all()?;
        let mut ledger: ProcessingLedger =
            storage::load_or(self.store, CheckpointKey::ProcessedState, ProcessingLedger::new);

        let start = ledger.current_index().min(links.len());
        let mut report = ProcessingReport {
            total: links.len() - start,
            ..Default::default()
        };

        tracing::info!(
            "Processing {} logged links from position {} ({} already processed)",
            report.total,
            start,
            ledger.processed_count()
        );

        for (position, link) in links.iter().enumerate().skip(start) {
            if ledger.is_processed(link) {
                tracing::debug!("Skipping already processed {}", link);
                report.skipped += 1;
                continue;
            }

            tracing::info!("[{}/{}] Processing {}", position + 1, links.len(), link);

            if let Err(e) = self.handle_item(client, &mut ledger, link, position).await {
                ledger.mark_failed(position);
                if let Err(save_err) =
                    storage::save(self.store, CheckpointKey::ProcessedState, &ledger)
                {
                    tracing::error!("Failed to save ledger after item failure: {}", save_err);
                }
                return Err(SpiderError::ItemFailed {
                    link: link.clone(),
                    position,
                    source: Box::new(e),
                });
            }
            report.processed += 1;

            if position + 1 < links.len() {
                self.settings.pacer.pause().await;
            }
        }

        tracing::info!(
            "Processing finished: {} stored, {} skipped",
            report.processed,
            report.skipped
        );
        Ok(report)
    }

    /// Fetch, store and checkpoint one link
    async fn handle_item(
        &self,
        client: &dyn PageClient,
        ledger: &mut ProcessingLedger,
        link: &str,
        position: usize,
    ) -> Result<(), SpiderError> {
        let id = submission_id(link).ok_or_else(|| SpiderError::InvalidLink(link.to_string()))?;

        let mut page = client.open_context().await?;
        let stored = self.fetch_and_store(client, page.as_mut(), link, &id).await;
        close_quietly(page, link).await;
        let path = stored?;

        // The in-memory ledger only advances once the save has landed
        let mut next = ledger.clone();
        next.mark_processed(link, position);
        storage::save(self.store, CheckpointKey::ProcessedState, &next)?;
        *ledger = next;

        tracing::debug!("Recorded {} as processed ({})", link, path.display());
        Ok(())
    }

    async fn fetch_and_store(
        &self,
        client: &dyn PageClient,
        page: &mut dyn PageContext,
        link: &str,
        id: &str,
    ) -> Result<PathBuf, SpiderError> {
        page.navigate(link, self.settings.navigation_timeout).await?;
        log_redirect(&*page, link);
        page.wait_for_selector(STATUS_LABEL, self.settings.selector_timeout)
            .await?;

        let detail: &dyn PageContext = page;
        let (status, language) = tokio::try_join!(
            detail.read_text(STATUS_LABEL),
            detail.read_text(LANGUAGE_LABEL)
        )?;
        let status = status.trim().to_string();
        let language = language.trim().to_string();
        tracing::debug!("Submission {}: status '{}', language '{}'", id, status, language);

        let content = self.fetch_source(client, id).await?;

        let artifact = Artifact {
            extension: language_extension(&language).to_string(),
            status,
            identifier: id.to_string(),
            language,
            content,
        };
        Ok(self.sink.persist(&artifact)?)
    }

    /// Reads the plain-text source in its own context
    async fn fetch_source(&self, client: &dyn PageClient, id: &str) -> Result<String, SpiderError> {
        let url = plaintext_link(&self.settings.site_root, id);
        let mut page = client.open_context().await?;

        let text = match page.navigate(&url, self.settings.navigation_timeout).await {
            Ok(()) => page.read_text(SOURCE_BODY).await,
            Err(e) => Err(e),
        };
        close_quietly(page, &url).await;

        Ok(text?)
    }
}
