// src/fetch/http.rs
// =============================================================================
// This module downloads pages over HTTP and hands them to the link extractor.
//
// Key functionality:
// - Makes HTTP GET requests asking for HTML (Accept header)
// - Gives up immediately when the crawl is cancelled, mid-request or mid-body
// - Skips anything that isn't HTML (images, PDFs, JSON, ...) without an error
// - Resolves links against the URL we landed on after redirects
// - Never retries: one attempt per page
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - tokio::select!: race the request against the cancellation token
// - Traits: HttpFetcher is one implementation of the Fetch trait
// =============================================================================

use super::links::{is_same_host, same_host_links};
use super::Fetch;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, FetchError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9";

/// Fetches pages with a shared reqwest client.
///
/// Cloning is cheap: the client is reference counted internally, so every
/// worker can hold its own copy and still share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Create an HTTP client with the crawl's settings
    // We'll reuse this client for all requests (connection pooling)
    pub fn new(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5)) // Follow up to 5 redirects
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<Vec<Url>, FetchError> {
        let request = self.client.get(url.clone()).header(ACCEPT, ACCEPT_HTML).send();

        // biased: once stop() has been called we don't care whether the
        // response happens to be ready too
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Vec::new()),
            result = request => result.map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        if !is_html(response.headers()) {
            return Ok(Vec::new());
        }

        // Redirects were followed, so relative links belong to the final URL.
        // A page that redirected off this host has nothing to offer us.
        let page = response.url().clone();
        if !is_same_host(url, &page) {
            debug!(%url, landed = %page, "redirected off host");
            return Ok(Vec::new());
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Vec::new()),
            result = response.text() => result.map_err(|source| FetchError::Body {
                url: url.clone(),
                source,
            })?,
        };

        // Parsing is synchronous; the scraper DOM never lives across an await
        same_host_links(&body, &page)
    }
}

// Checks the Content-Type header for an HTML media type
//
// "text/html; charset=utf-8" -> true
// "application/json"         -> false
// (missing)                  -> false
fn is_html(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let media_type = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    media_type == "text/html" || media_type == "application/xhtml+xml"
}
