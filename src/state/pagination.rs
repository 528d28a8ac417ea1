//! Pagination cursor for the discovery phase

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Discovery progress through the submission listing
///
/// `page` and `last_page` only move forward; a page is recorded once its
/// links have been appended to the link log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationCheckpoint {
    /// Most recent page number the cursor points at (1-based)
    pub page: u32,

    /// Last page whose links were fully written to the log
    #[serde(default)]
    pub last_page: Option<u32>,

    /// Listing URL without the `page` query parameter
    pub base_url: String,

    /// Fields written by other tools, carried through saves untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaginationCheckpoint {
    /// Fresh cursor positioned at the first page of `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            page: 1,
            last_page: None,
            base_url: base_url.into(),
            extra: Map::new(),
        }
    }

    /// Page number discovery should fetch next
    ///
    /// A recorded `last_page` has already reached the log, so traversal
    /// continues after it.
    pub fn resume_page(&self) -> u32 {
        let next = match self.last_page {
            Some(last) => last.saturating_add(1),
            None => self.page,
        };
        next.max(self.page).max(1)
    }

    /// Records that page `page` has been appended to the link log
    pub fn record_page(&mut self, page: u32) {
        self.page = self.page.max(page);
        self.last_page = Some(self.last_page.map_or(page, |last| last.max(page)));
    }

    /// URL of listing page `page`
    pub fn page_url(&self, page: u32) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        Ok(url.into())
    }
}
