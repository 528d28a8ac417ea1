use crate::ConfigResult;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for Solution-Spider
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The submission listing being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Site root, e.g. `https://www.codechef.com`
    #[serde(rename = "site-url", default = "default_site_url")]
    pub site_url: String,

    /// Problem code whose submissions are listed
    #[serde(rename = "problem-id")]
    pub problem_id: String,

    /// Contest or practice category the problem lives under
    pub category: String,

    /// Language filter applied to the listing
    #[serde(default = "default_language")]
    pub language: String,

    /// Rows requested per listing page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,
}

impl TargetConfig {
    /// Site root without a trailing slash
    pub fn site_root(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    /// Listing URL for the first page, without the `page` parameter
    ///
    /// Query values are form-encoded, so labels such as `C++17` or `PYTH 3`
    /// reach the server intact.
    pub fn listing_url(&self) -> ConfigResult<String> {
        let mut url = Url::parse(&format!(
            "{}/{}/status/{}",
            self.site_root(),
            self.category,
            self.problem_id
        ))
        .map_err(|e| crate::ConfigError::InvalidUrl(format!("Invalid listing URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("language", &self.language)
            .append_pair("limit", &self.page_size.to_string());
        Ok(url.into())
    }
}

/// Crawler pacing and limits (all durations in milliseconds)
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Highest listing page that will ever be fetched
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(rename = "navigation-timeout", default = "default_timeout")]
    pub navigation_timeout: u64,

    #[serde(rename = "selector-timeout", default = "default_timeout")]
    pub selector_timeout: u64,

    /// Base delay between listing pages
    #[serde(rename = "page-delay", default = "default_page_delay")]
    pub page_delay: u64,

    #[serde(rename = "page-jitter", default = "default_page_jitter")]
    pub page_jitter: u64,

    /// Base delay between processed submissions
    #[serde(rename = "item-delay", default = "default_item_delay")]
    pub item_delay: u64,

    #[serde(rename = "item-jitter", default = "default_item_jitter")]
    pub item_jitter: u64,
}

impl CrawlerConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            navigation_timeout: default_timeout(),
            selector_timeout: default_timeout(),
            page_delay: default_page_delay(),
            page_jitter: default_page_jitter(),
            item_delay: default_item_delay(),
            item_jitter: default_item_jitter(),
        }
    }
}

/// HTTP identity of the page client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Name of an environment variable holding an authenticated session cookie
    #[serde(rename = "session-cookie-env", default)]
    pub session_cookie_env: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            session_cookie_env: None,
        }
    }
}

/// Which checkpoint backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    #[default]
    Json,
    Sqlite,
}

/// Checkpoint and link log location
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_state_dir")]
    pub directory: PathBuf,

    #[serde(default)]
    pub backend: StateBackend,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            directory: default_state_dir(),
            backend: StateBackend::default(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for harvested solutions
    #[serde(rename = "solutions-directory", default = "default_solutions_dir")]
    pub solutions_directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            solutions_directory: default_solutions_dir(),
        }
    }
}

fn default_site_url() -> String {
    "https://www.codechef.com".to_string()
}

fn default_language() -> String {
    "C".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    20
}

fn default_timeout() -> u64 {
    60_000
}

fn default_page_delay() -> u64 {
    5_000
}

fn default_page_jitter() -> u64 {
    3_000
}

fn default_item_delay() -> u64 {
    10_000
}

fn default_item_jitter() -> u64 {
    2_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./state")
}

fn default_solutions_dir() -> PathBuf {
    PathBuf::from("./solutions")
}
