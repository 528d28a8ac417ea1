//! Scripted page client and recording sink for engine tests

use crate::crawler::client::{has_selector, select_text, BrowseError, PageClient, PageContext};
use crate::output::{Artifact, ArtifactSink, SinkError, SinkResult};
use crate::storage::{CheckpointKey, CheckpointStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SITE: &str = "https://judge.test";
pub const LISTING: &str = "https://judge.test/CAT/status/PROB?language=C&limit=100";

/// Listing page with the given ids and pagination state
pub fn listing_html(ids: &[&str], has_next: bool) -> String {
    let rows: String = ids
        .iter()
        .map(|id| format!("<tr><td>{}</td><td>user</td></tr>", id))
        .collect();
    let next = if has_next {
        r#"<button aria-label="Next Page">›</button>"#
    } else {
        r#"<button aria-label="Next Page" disabled>›</button>"#
    };
    format!(
        r#"<html><body><table><tbody class="MuiTableBody-root">{}</tbody></table>{}</body></html>"#,
        rows, next
    )
}

/// Solution page carrying a verdict and language label
pub fn detail_html(status: &str, language: &str) -> String {
    format!(
        r#"<html><body>
            <div class="css_status_container"><span>{}</span></div>
            <div class="css_ideLanguageName">{}</div>
        </body></html>"#,
        status, language
    )
}

pub fn source_html(code: &str) -> String {
    format!("<html><body>{}</body></html>", code)
}

pub fn listing_page_url(page: u32) -> String {
    format!("{}&page={}", LISTING, page)
}

pub fn solution_url(id: &str) -> String {
    format!("{}/viewsolution/{}", SITE, id)
}

pub fn plaintext_url(id: &str) -> String {
    format!("{}/viewplaintext/{}", SITE, id)
}

#[derive(Default)]
struct Shared {
    pages: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    visits: Mutex<Vec<String>>,
    open: AtomicUsize,
    opened: AtomicUsize,
}

/// Serves canned HTML by exact URL and records every navigation
#[derive(Clone, Default)]
pub struct ScriptedClient {
    shared: Arc<Shared>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, url: impl Into<String>, html: impl Into<String>) -> &Self {
        self.shared.pages.lock().unwrap().insert(url.into(), html.into());
        self
    }

    /// Navigations to `url` time out
    pub fn fail(&self, url: impl Into<String>) -> &Self {
        self.shared.failing.lock().unwrap().insert(url.into());
        self
    }

    pub fn heal(&self, url: &str) -> &Self {
        self.shared.failing.lock().unwrap().remove(url);
        self
    }

    /// Registers a complete submission: solution page plus plain-text source
    pub fn submission(&self, id: &str, status: &str, language: &str, code: &str) -> &Self {
        self.page(solution_url(id), detail_html(status, language));
        self.page(plaintext_url(id), source_html(code));
        self
    }

    pub fn visits(&self) -> Vec<String> {
        self.shared.visits.lock().unwrap().clone()
    }

    pub fn clear_visits(&self) {
        self.shared.visits.lock().unwrap().clear();
    }

    /// Contexts opened and not yet closed
    pub fn open_contexts(&self) -> usize {
        self.shared.open.load(Ordering::SeqCst)
    }

    pub fn opened_contexts(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageClient for ScriptedClient {
    async fn open_context(&self) -> Result<Box<dyn PageContext>, BrowseError> {
        self.shared.open.fetch_add(1, Ordering::SeqCst);
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedContext {
            shared: Arc::clone(&self.shared),
            loaded: None,
        }))
    }
}

struct ScriptedContext {
    shared: Arc<Shared>,
    loaded: Option<(String, String)>,
}

impl ScriptedContext {
    fn loaded(&self) -> Result<&(String, String), BrowseError> {
        self.loaded.as_ref().ok_or(BrowseError::NoDocument)
    }
}

#[async_trait]
impl PageContext for ScriptedContext {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowseError> {
        self.shared.visits.lock().unwrap().push(url.to_string());

        if self.shared.failing.lock().unwrap().contains(url) {
            return Err(BrowseError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }

        let html = self.shared.pages.lock().unwrap().get(url).cloned();
        match html {
            Some(html) => {
                self.loaded = Some((url.to_string(), html));
                Ok(())
            }
            None => Err(BrowseError::Navigation {
                url: url.to_string(),
                message: "HTTP 404".to_string(),
            }),
        }
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<(), BrowseError> {
        let (url, html) = self.loaded()?;
        if has_selector(html, selector)? {
            Ok(())
        } else {
            Err(BrowseError::SelectorNotFound {
                selector: selector.to_string(),
                url: url.clone(),
            })
        }
    }

    async fn read_text(&self, selector: &str) -> Result<String, BrowseError> {
        let (url, html) = self.loaded()?;
        select_text(html, selector)?.ok_or_else(|| BrowseError::SelectorNotFound {
            selector: selector.to_string(),
            url: url.clone(),
        })
    }

    async fn content(&self) -> Result<String, BrowseError> {
        Ok(self.loaded()?.1.clone())
    }

    fn current_url(&self) -> Option<&str> {
        self.loaded.as_ref().map(|(url, _)| url.as_str())
    }

    async fn close(self: Box<Self>) -> Result<(), BrowseError> {
        self.shared.open.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink that keeps artifacts in memory and can be told to fail
#[derive(Default)]
pub struct RecordingSink {
    written: Mutex<Vec<Artifact>>,
    failing_ids: Mutex<HashSet<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn heal(&self, id: &str) {
        self.failing_ids.lock().unwrap().remove(id);
    }

    pub fn written(&self) -> Vec<Artifact> {
        self.written.lock().unwrap().clone()
    }

    pub fn written_ids(&self) -> Vec<String> {
        self.written()
            .into_iter()
            .map(|artifact| artifact.identifier)
            .collect()
    }
}

impl ArtifactSink for RecordingSink {
    fn persist(&self, artifact: &Artifact) -> SinkResult<PathBuf> {
        if self.failing_ids.lock().unwrap().contains(&artifact.identifier) {
            return Err(SinkError::Io {
                path: PathBuf::from(&artifact.identifier),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.written.lock().unwrap().push(artifact.clone());
        Ok(PathBuf::from(format!(
            "{}.{}",
            artifact.identifier, artifact.extension
        )))
    }
}

/// Checkpoint store whose writes can be switched to fail
pub struct FlakyStore<S> {
    inner: S,
    writes: AtomicUsize,
    fail_from: AtomicUsize,
}

impl<S: CheckpointStore> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            fail_from: AtomicUsize::new(usize::MAX),
        }
    }

    /// Lets `count` more writes through, then fails every write after them
    pub fn fail_after(&self, count: usize) {
        let start = self.writes.load(Ordering::SeqCst);
        self.fail_from.store(start + count, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.fail_from.store(usize::MAX, Ordering::SeqCst);
    }

    /// Writes attempted so far, failed ones included
    pub fn attempted_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<S: CheckpointStore> CheckpointStore for FlakyStore<S> {
    fn read(&self, key: CheckpointKey) -> StorageResult<Option<String>> {
        self.inner.read(key)
    }

    fn write(&self, key: CheckpointKey, document: &str) -> StorageResult<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst);
        if n >= self.fail_from.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no space left on device",
            )));
        }
        self.inner.write(key, document)
    }

    fn describe(&self) -> String {
        format!("flaky {}", self.inner.describe())
    }
}
