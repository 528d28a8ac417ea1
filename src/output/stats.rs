//! Progress report built from the checkpoints on disk
//!
//! Used by `--stats` to show where an interrupted harvest would resume.

use crate::state::{PaginationCheckpoint, ProcessingLedger};
use crate::storage::{self, CheckpointKey, CheckpointStore, LinkLog};
use crate::SpiderError;
use std::collections::HashSet;

/// Snapshot of both phases' progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestStatus {
    /// Listing URL discovery walks
    pub base_url: String,

    /// Last listing page fully written to the log
    pub last_page: Option<u32>,

    /// Page discovery would fetch next
    pub next_page: u32,

    /// Whether the link log exists (discovery is skipped if so)
    pub link_log_present: bool,

    /// Entries in the link log, duplicates included
    pub logged_links: usize,

    /// Distinct links in the log
    pub unique_links: usize,

    /// Links recorded as processed
    pub processed: usize,

    /// Ledger cursor into the link log
    pub current_index: usize,

    /// Log entries at or after the cursor not yet processed
    pub remaining: usize,
}

/// Loads the current status from the checkpoint store and link log
pub fn load_status(
    store: &dyn CheckpointStore,
    log: &LinkLog,
    listing_url: &str,
) -> Result<HarvestStatus, SpiderError> {
    let checkpoint: PaginationCheckpoint = storage::load_or(store, CheckpointKey::PageState, || {
        PaginationCheckpoint::new(listing_url)
    });
    let ledger: ProcessingLedger =
        storage::load_or(store, CheckpointKey::ProcessedState, ProcessingLedger::new);

    let links = log.read_all()?;
    let unique_links = links.iter().collect::<HashSet<_>>().len();
    let start = ledger.current_index().min(links.len());
    let remaining = links[start..]
        .iter()
        .filter(|link| !ledger.is_processed(link))
        .collect::<HashSet<_>>()
        .len();

    Ok(HarvestStatus {
        base_url: checkpoint.base_url.clone(),
        last_page: checkpoint.last_page,
        next_page: checkpoint.resume_page(),
        link_log_present: log.exists(),
        logged_links: links.len(),
        unique_links,
        processed: ledger.processed_count(),
        current_index: ledger.current_index(),
        remaining,
    })
}

/// Prints status to stdout
pub fn print_status(status: &HarvestStatus) {
    println!("=== Harvest Status ===\n");

    println!("Discovery:");
    println!("  Listing: {}", status.base_url);
    match status.last_page {
        Some(page) => println!("  Last recorded page: {}", page),
        None => println!("  Last recorded page: none"),
    }
    println!("  Next page: {}", status.next_page);
    println!(
        "  Link log: {}",
        if status.link_log_present {
            "present (discovery will be skipped)"
        } else {
            "missing (discovery will run)"
        }
    );
    println!(
        "  Links logged: {} ({} unique)",
        status.logged_links, status.unique_links
    );

    println!("\nProcessing:");
    println!("  Processed: {}", status.processed);
    println!("  Cursor: {}", status.current_index);
    println!("  Remaining: {}", status.remaining);
}
