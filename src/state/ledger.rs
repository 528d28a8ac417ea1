//! Processing ledger for the item phase

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// On-disk shape of the ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerDocument {
    #[serde(default)]
    processed: Vec<String>,

    #[serde(default)]
    current_index: usize,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Which links have been handled and where in the link log to resume
///
/// `processed` is the authoritative membership test; `current_index` is a
/// forward-only cursor into the full link log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "LedgerDocument", into = "LedgerDocument")]
pub struct ProcessingLedger {
    processed: Vec<String>,
    members: HashSet<String>,
    current_index: usize,
    extra: Map<String, Value>,
}

impl From<LedgerDocument> for ProcessingLedger {
    fn from(doc: LedgerDocument) -> Self {
        let mut ledger = Self {
            processed: Vec::with_capacity(doc.processed.len()),
            members: HashSet::with_capacity(doc.processed.len()),
            current_index: doc.current_index,
            extra: doc.extra,
        };
        for link in doc.processed {
            ledger.insert(link);
        }
        ledger
    }
}

impl From<ProcessingLedger> for LedgerDocument {
    fn from(ledger: ProcessingLedger) -> Self {
        Self {
            processed: ledger.processed,
            current_index: ledger.current_index,
            extra: ledger.extra,
        }
    }
}

impl PartialEq for ProcessingLedger {
    fn eq(&self, other: &Self) -> bool {
        self.processed == other.processed
            && self.current_index == other.current_index
            && self.extra == other.extra
    }
}

impl ProcessingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position in the link log processing resumes from
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Links recorded as processed, in completion order
    pub fn processed(&self) -> &[String] {
        &self.processed
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn is_processed(&self, link: &str) -> bool {
        self.members.contains(link)
    }

    /// Records a link whose artifact has been written
    ///
    /// `position` is the link's index in the full log; the cursor moves past it.
    pub fn mark_processed(&mut self, link: &str, position: usize) {
        self.insert(link.to_string());
        self.current_index = self.current_index.max(position + 1);
    }

    /// Parks the cursor on a failed link so the next run retries it
    pub fn mark_failed(&mut self, position: usize) {
        self.current_index = self.current_index.max(position);
    }

    fn insert(&mut self, link: String) {
        if self.members.insert(link.clone()) {
            self.processed.push(link);
        }
    }
}
