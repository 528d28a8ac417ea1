//! Rendered-page client interface
//!
//! The engines never talk to the network directly. They open page contexts
//! from a [`PageClient`], navigate them, and query the loaded document. A
//! context must be closed on every exit path; [`close_quietly`] does that
//! without masking the error that caused the exit.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by page clients
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Selector '{selector}' not found on {url}")]
    SelectorNotFound { selector: String, url: String },

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("No page has been loaded in this context")]
    NoDocument,
}

/// A single page (tab) that can be navigated and queried
#[async_trait]
pub trait PageContext: Send + Sync {
    /// Loads `url`, failing with `NavigationTimeout` once `timeout` elapses
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowseError>;

    /// Waits until `selector` matches an element in the loaded page
    ///
    /// Implementations backed by static documents may treat this as a single
    /// presence check and ignore `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<(), BrowseError>;

    /// Text content of the first element matching `selector`
    async fn read_text(&self, selector: &str) -> Result<String, BrowseError>;

    /// Snapshot of the rendered document
    async fn content(&self) -> Result<String, BrowseError>;

    /// URL of the loaded document
    fn current_url(&self) -> Option<&str>;

    /// Releases the context
    async fn close(self: Box<Self>) -> Result<(), BrowseError>;
}

/// Long-lived, already-authenticated client handing out page contexts
#[async_trait]
pub trait PageClient: Send + Sync {
    async fn open_context(&self) -> Result<Box<dyn PageContext>, BrowseError>;
}

/// Runs `extractor` against a parsed snapshot of the page
///
/// This is the DOM-evaluation step: the extractor sees the rendered document
/// and returns plain data.
pub async fn evaluate<T, F>(page: &dyn PageContext, extractor: F) -> Result<T, BrowseError>
where
    F: FnOnce(&Html) -> T,
{
    let content = page.content().await?;
    let document = Html::parse_document(&content);
    Ok(extractor(&document))
}

/// Closes `page`, logging rather than returning a close failure
pub async fn close_quietly(page: Box<dyn PageContext>, label: &str) {
    if let Err(e) = page.close().await {
        tracing::warn!("Failed to close page for {}: {}", label, e);
    }
}

/// Notes when the loaded document is not the one requested
pub(crate) fn log_redirect(page: &dyn PageContext, requested: &str) {
    if let Some(loaded) = page.current_url() {
        if loaded != requested {
            tracing::debug!("{} redirected to {}", requested, loaded);
        }
    }
}

/// Text of the first element matching `selector` in an HTML document
pub(crate) fn select_text(html: &str, selector: &str) -> Result<Option<String>, BrowseError> {
    let parsed =
        Selector::parse(selector).map_err(|_| BrowseError::InvalidSelector(selector.to_string()))?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&parsed)
        .next()
        .map(|element| element.text().collect::<String>()))
}

/// Whether `selector` matches anything in an HTML document
pub(crate) fn has_selector(html: &str, selector: &str) -> Result<bool, BrowseError> {
    let parsed =
        Selector::parse(selector).map_err(|_| BrowseError::InvalidSelector(selector.to_string()))?;
    let document = Html::parse_document(html);
    let found = document.select(&parsed).next().is_some();
    Ok(found)
}
