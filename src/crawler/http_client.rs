//! HTTP-backed page client
//!
//! This client fetches documents with reqwest and answers DOM queries from
//! the fetched HTML with scraper. It covers listings and submission pages
//! that are rendered server-side. Authentication is provided up front as a
//! session cookie; this client never logs in by itself.

use crate::config::ClientConfig;
use crate::crawler::client::{has_selector, select_text, BrowseError, PageClient, PageContext};
use crate::{ConfigError, SpiderError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE};
use reqwest::Client;
use std::time::Duration;

/// Upper bound on establishing a connection, separate from the navigation timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client with the configured identity
///
/// # Arguments
///
/// * `config` - The client identity configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(SpiderError)` - A header value was invalid or the client failed to build
pub fn build_http_client(config: &ClientConfig) -> Result<Client, SpiderError> {
    let mut headers = HeaderMap::new();

    let accept_language = HeaderValue::from_str(&config.accept_language).map_err(|_| {
        ConfigError::Validation(format!(
            "accept-language '{}' is not a valid header value",
            config.accept_language
        ))
    })?;
    headers.insert(ACCEPT_LANGUAGE, accept_language);

    if let Some(var) = &config.session_cookie_env {
        match std::env::var(var) {
            Ok(cookie) if !cookie.is_empty() => {
                let mut value = HeaderValue::from_str(&cookie).map_err(|_| {
                    ConfigError::Validation(format!(
                        "session cookie in ${} is not a valid header value",
                        var
                    ))
                })?;
                value.set_sensitive(true);
                headers.insert(COOKIE, value);
                tracing::debug!("Using session cookie from ${}", var);
            }
            _ => tracing::warn!("${} is not set, requests will be anonymous", var),
        }
    }

    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Page client issuing one HTTP GET per navigation
#[derive(Clone)]
pub struct HttpPageClient {
    client: Client,
}

impl HttpPageClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SpiderError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageClient for HttpPageClient {
    async fn open_context(&self) -> Result<Box<dyn PageContext>, BrowseError> {
        Ok(Box::new(HttpPageContext {
            client: self.client.clone(),
            page: None,
        }))
    }
}

/// A fetched document
#[derive(Debug, Clone)]
struct LoadedPage {
    url: String,
    body: String,
    is_html: bool,
}

/// One "tab" of the HTTP client, holding the last fetched document
pub struct HttpPageContext {
    client: Client,
    page: Option<LoadedPage>,
}

impl HttpPageContext {
    fn loaded(&self) -> Result<&LoadedPage, BrowseError> {
        self.page.as_ref().ok_or(BrowseError::NoDocument)
    }

    async fn fetch(&self, url: &str) -> Result<LoadedPage, BrowseError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| navigation_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowseError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        let is_html = content_type.is_empty() || content_type.contains("html");

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| navigation_error(url, e))?;

        Ok(LoadedPage {
            url: final_url,
            body,
            is_html,
        })
    }
}

#[async_trait]
impl PageContext for HttpPageContext {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowseError> {
        tracing::debug!("GET {}", url);
        let page = match tokio::time::timeout(timeout, self.fetch(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BrowseError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        };
        self.page = Some(page);
        Ok(())
    }

    /// A fetched document does not change after load, so this is a single
    /// presence check rather than a poll.
    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<(), BrowseError> {
        let page = self.loaded()?;
        if page.is_html && has_selector(&page.body, selector)? {
            Ok(())
        } else {
            Err(BrowseError::SelectorNotFound {
                selector: selector.to_string(),
                url: page.url.clone(),
            })
        }
    }

    async fn read_text(&self, selector: &str) -> Result<String, BrowseError> {
        let page = self.loaded()?;

        // Plain-text responses have no markup; their whole body is the text
        if !page.is_html {
            return if selector == "body" {
                Ok(page.body.clone())
            } else {
                Err(BrowseError::SelectorNotFound {
                    selector: selector.to_string(),
                    url: page.url.clone(),
                })
            };
        }

        select_text(&page.body, selector)?.ok_or_else(|| BrowseError::SelectorNotFound {
            selector: selector.to_string(),
            url: page.url.clone(),
        })
    }

    async fn content(&self) -> Result<String, BrowseError> {
        Ok(self.loaded()?.body.clone())
    }

    fn current_url(&self) -> Option<&str> {
        self.page.as_ref().map(|page| page.url.as_str())
    }

    async fn close(self: Box<Self>) -> Result<(), BrowseError> {
        Ok(())
    }
}

fn navigation_error(url: &str, error: reqwest::Error) -> BrowseError {
    if error.is_timeout() {
        BrowseError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: CONNECT_TIMEOUT.as_millis() as u64,
        }
    } else {
        BrowseError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
