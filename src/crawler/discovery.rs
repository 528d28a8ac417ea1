//! Link discovery: walks the submission listing page by page
//!
//! For each page the engine fetches the listing, extracts submission ids,
//! appends their solution links to the link log and only then records the
//! page in the pagination checkpoint. A crash between the append and the
//! save re-fetches that page on the next run; the duplicate log entries are
//! skipped later by the processing ledger.

use crate::config::Config;
use crate::crawler::client::{close_quietly, evaluate, log_redirect, PageClient, PageContext};
use crate::crawler::extract::{extract_submission_ids, has_next_page, solution_link, LISTING_CONTAINER};
use crate::crawler::pacing::Pacer;
use crate::state::PaginationCheckpoint;
use crate::storage::{self, CheckpointKey, CheckpointStore, LinkLog};
use crate::SpiderError;
use std::time::Duration;

/// Immutable inputs of a discovery run
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Listing URL used when no checkpoint exists yet
    pub listing_url: String,

    /// Site root solution links are built on
    pub site_root: String,

    /// Highest page number ever fetched
    pub max_pages: u32,

    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,

    /// Delay between listing pages
    pub pacer: Pacer,
}

impl DiscoverySettings {
    pub fn from_config(config: &Config) -> Result<Self, SpiderError> {
        Ok(Self {
            listing_url: config.target.listing_url()?,
            site_root: config.target.site_root().to_string(),
            max_pages: config.crawler.max_pages,
            navigation_timeout: config.crawler.navigation_timeout(),
            selector_timeout: config.crawler.selector_timeout(),
            pacer: Pacer::from_millis(config.crawler.page_delay, config.crawler.page_jitter),
        })
    }
}

/// Why a discovery run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The listing had no enabled "Next Page" control
    NoNextPage,

    /// The last fetched page listed no submissions
    EmptyPage,

    /// The page bound was reached
    PageBound,

    /// The checkpoint was already past the page bound; nothing was fetched
    AlreadyPastBound,
}

/// Outcome of a discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Links appended to the log during this run, in order
    pub links: Vec<String>,

    pub pages_fetched: u32,

    /// Last page recorded in the checkpoint
    pub last_page: Option<u32>,

    pub stop: StopReason,
}

/// What one listing page yielded
struct ListingPage {
    links: Vec<String>,
    has_next: bool,
}

/// Drives the listing traversal
pub struct DiscoveryEngine<'a> {
    settings: DiscoverySettings,
    store: &'a dyn CheckpointStore,
    log: &'a LinkLog,
}

impl<'a> DiscoveryEngine<'a> {
    pub fn new(settings: DiscoverySettings, store: &'a dyn CheckpointStore, log: &'a LinkLog) -> Self {
        Self {
            settings,
            store,
            log,
        }
    }

    /// Runs discovery from the stored cursor until a stop condition
    ///
    /// Any navigation, selector or storage failure aborts the run with
    /// [`SpiderError::PageFailed`]; pages recorded before it stay recorded.
    pub async fn run(&self, client: &dyn PageClient) -> Result<DiscoveryReport, SpiderError> {
        let mut page = client.open_context().await?;
        let result = self.walk(page.as_mut()).await;
        close_quietly(page, "listing").await;
        result
    }

    async fn walk(&self, page: &mut dyn PageContext) -> Result<DiscoveryReport, SpiderError> {
        let mut checkpoint: PaginationCheckpoint =
            storage::load_or(self.store, CheckpointKey::PageState, || {
                PaginationCheckpoint::new(self.settings.listing_url.clone())
            });

        if checkpoint.base_url != self.settings.listing_url {
            tracing::warn!(
                "Checkpoint listing {} differs from configured {}; continuing with the checkpoint",
                checkpoint.base_url,
                self.settings.listing_url
            );
        }

        let mut page_number = checkpoint.resume_page();
        let mut links = Vec::new();
        let mut pages_fetched = 0;

        if page_number > self.settings.max_pages {
            tracing::info!(
                "Checkpoint is at page {}, past the bound of {}; nothing to discover",
                page_number,
                self.settings.max_pages
            );
            return Ok(DiscoveryReport {
                links,
                pages_fetched,
                last_page: checkpoint.last_page,
                stop: StopReason::AlreadyPastBound,
            });
        }

        let stop = loop {
            tracing::info!("Fetching listing page {}", page_number);

            let listing = self
                .discover_page(page, &mut checkpoint, page_number)
                .await
                .map_err(|e| SpiderError::PageFailed {
                    page: page_number,
                    source: Box::new(e),
                })?;
            pages_fetched += 1;

            tracing::info!("Page {} listed {} submissions", page_number, listing.links.len());
            let empty = listing.links.is_empty();
            links.extend(listing.links);

            if empty {
                break StopReason::EmptyPage;
            }
            if !listing.has_next {
                break StopReason::NoNextPage;
            }
            if page_number >= self.settings.max_pages {
                tracing::info!("Reached the page bound of {}", self.settings.max_pages);
                break StopReason::PageBound;
            }

            page_number += 1;
            self.settings.pacer.pause().await;
        };

        tracing::info!(
            "Discovery finished ({:?}): {} links from {} pages",
            stop,
            links.len(),
            pages_fetched
        );

        Ok(DiscoveryReport {
            links,
            pages_fetched,
            last_page: checkpoint.last_page,
            stop,
        })
    }

    /// Fetch, extract, append, checkpoint: one listing page
    async fn discover_page(
        &self,
        page: &mut dyn PageContext,
        checkpoint: &mut PaginationCheckpoint,
        page_number: u32,
    ) -> Result<ListingPage, SpiderError> {
        let url = checkpoint.page_url(page_number)?;
        page.navigate(&url, self.settings.navigation_timeout).await?;
        log_redirect(&*page, &url);
        page.wait_for_selector(LISTING_CONTAINER, self.settings.selector_timeout)
            .await?;

        let (ids, has_next) = evaluate(&*page, |document| {
            (extract_submission_ids(document), has_next_page(document))
        })
        .await?;

        let links: Vec<String> = ids
            .iter()
            .map(|id| solution_link(&self.settings.site_root, id))
            .collect();

        self.log.append(&links)?;

        checkpoint.record_page(page_number);
        storage::save(self.store, CheckpointKey::PageState, checkpoint)?;

        Ok(ListingPage { links, has_next })
    }
}
