//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `PaginationCheckpoint`: how far discovery has walked the submission listing
//! - `ProcessingLedger`: which discovered links have been fetched and stored

mod ledger;
mod pagination;

// Re-export main types
pub use ledger::ProcessingLedger;
pub use pagination::PaginationCheckpoint;
