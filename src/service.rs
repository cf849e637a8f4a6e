// src/service.rs
// =============================================================================
// Bookkeeping for several crawls at once.
//
// The service maps each requested URL to its running Spider, and keeps the
// finished tree of every crawl that has been stopped so it can be listed
// later. Starting a URL again after stopping it replaces the old tree once
// the new crawl is stopped.
// =============================================================================

use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::site::SiteTree;
use crate::spider::Spider;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// A finished crawl, as reported by [`CrawlService::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteListing {
    pub url: String,
    pub tree: SiteTree,
}

/// Starts, stops and remembers crawls keyed by the URL they were started with.
pub struct CrawlService {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetch>,
    spiders: HashMap<String, Spider>,
    trees: HashMap<String, SiteTree>,
}

impl CrawlService {
    /// A service whose crawls fetch over HTTP. One client is shared by all of
    /// them.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    pub fn with_fetcher(config: CrawlConfig, fetcher: Arc<dyn Fetch>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            spiders: HashMap::new(),
            trees: HashMap::new(),
        })
    }

    /// Starts crawling `url`.
    ///
    /// Fails with `AlreadyRunning` if `url` is being crawled, or `InvalidSeed`
    /// if it can't be crawled at all.
    pub fn start(&mut self, url: &str) -> Result<()> {
        if self.spiders.contains_key(url) {
            return Err(CrawlError::AlreadyRunning);
        }

        let mut spider = Spider::with_fetcher(self.config.clone(), Arc::clone(&self.fetcher))?;
        spider.start(url)?;
        self.spiders.insert(url.to_string(), spider);
        Ok(())
    }

    /// Stops crawling `url` and returns its tree. The tree is also kept for
    /// [`list`](Self::list).
    pub async fn stop(&mut self, url: &str) -> Result<SiteTree> {
        let mut spider = self.spiders.remove(url).ok_or(CrawlError::NotRunning)?;
        let tree = spider.stop().await?;
        self.trees.insert(url.to_string(), tree.clone());
        Ok(tree)
    }

    /// Stops every running crawl concurrently. Crawls that fail to stop
    /// cleanly are logged and left out of the listing.
    pub async fn stop_all(&mut self) {
        let stops = self.spiders.drain().map(|(url, mut spider)| async move {
            let result = spider.stop().await;
            (url, result)
        });

        for (url, result) in join_all(stops).await {
            match result {
                Ok(tree) => {
                    self.trees.insert(url, tree);
                }
                Err(err) => warn!(%url, error = %err, "crawl did not stop cleanly"),
            }
        }
    }

    /// Resolves once every running crawl has run out of pages to fetch.
    pub async fn wait_idle(&self) {
        join_all(self.spiders.values().map(|spider| spider.wait_idle())).await;
    }

    /// URLs currently being crawled, sorted.
    pub fn running(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.spiders.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    /// Every stopped crawl's tree, sorted by URL.
    pub fn list(&self) -> Vec<SiteListing> {
        let mut listings: Vec<SiteListing> = self
            .trees
            .iter()
            .map(|(url, tree)| SiteListing {
                url: url.clone(),
                tree: tree.clone(),
            })
            .collect();
        listings.sort_by(|a, b| a.url.cmp(&b.url));
        listings
    }
}

impl fmt::Debug for CrawlService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlService")
            .field("config", &self.config)
            .field("running", &self.running())
            .field("finished", &self.trees.len())
            .finish()
    }
}
