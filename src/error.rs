// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// There are two families:
// - CrawlError: returned synchronously to whoever drives a crawl (bad seed,
//   double start, stop without start, bad configuration).
// - FetchError: something went wrong with ONE page. The spider logs these and
//   keeps going, so they never reach the caller of start/stop.
//
// Cancellation is deliberately absent from both: a fetch cut short by stop()
// just yields no links.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Errors reported to the caller of a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed URL '{seed}': {reason}")]
    InvalidSeed { seed: String, reason: String },

    #[error("crawl is already running")]
    AlreadyRunning,

    #[error("crawl is not running")]
    NotRunning,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("config file parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("crawl task ended abnormally: {0}")]
    Crashed(#[from] tokio::task::JoinError),
}

impl CrawlError {
    pub(crate) fn invalid_seed(seed: &str, reason: impl Into<String>) -> Self {
        CrawlError::InvalidSeed {
            seed: seed.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors for a single page. Every variant names the URL at fault.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: Url, status: StatusCode },

    #[error("failed to read body of {url}: {source}")]
    Body {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed href '{href}' on {page}: {source}")]
    Href {
        page: Url,
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not parse {url}: {reason}")]
    Parse { url: Url, reason: String },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;
