// src/lib.rs
// =============================================================================
// site-mapper: discovers every same-host page reachable from a seed URL and
// folds the paths into a sorted site tree.
//
// Modules:
// - site: the SiteTree data structure (+ a text renderer)
// - fetch: downloads one page and extracts its same-host links
// - spider: runs one crawl (orchestrator + fixed pool of fetch workers)
// - service: runs several crawls keyed by URL
// - config / error: settings and error types shared by all of the above
//
// Quick start:
//
//   let mut spider = Spider::new(CrawlConfig::default())?;
//   spider.start("https://example.com/")?;
//   spider.wait_idle().await?;
//   let tree = spider.stop().await?;
//   print!("{}", site::render(&tree));
// =============================================================================

pub mod config;
pub mod error;
pub mod fetch;
pub mod service;
pub mod site;
pub mod spider;

pub use config::CrawlConfig;
pub use error::{CrawlError, FetchError};
pub use fetch::{Fetch, HttpFetcher};
pub use service::{CrawlService, SiteListing};
pub use site::SiteTree;
pub use spider::{parse_seed, Spider, SpiderStatus};
