// src/fetch/mod.rs
// =============================================================================
// This module turns one URL into the list of same-host URLs it links to.
//
// Submodules:
// - http: the real fetcher (reqwest GET + Content-Type check)
// - links: pulls <a href> links out of HTML with scraper
//
// The spider only knows about the Fetch trait, so tests can swap in a fake
// site without touching the network.
// =============================================================================

mod http;
pub mod links;

pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Retrieves one page and reports the same-host links found on it.
///
/// Implementations must be safe to call from many tasks at once and should
/// return promptly with `Ok(vec![])` once `cancel` fires. Cancellation is not
/// an error.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<Vec<Url>, FetchError>;
}
