// src/config.rs
// =============================================================================
// Crawl settings.
//
// Settings are layered, lowest precedence first:
// 1. CrawlConfig::default()
// 2. an optional TOML file with a [crawl] table
// 3. command-line flags / SITE_MAPPER_* environment variables (see cli.rs)
//
// Example file:
//
//   [crawl]
//   workers = 16
//   frontier_capacity = 512
//   request_timeout_secs = 5
//   user_agent = "my-mapper/1.0"
// =============================================================================

use crate::error::{CrawlError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_FRONTIER_CAPACITY: usize = 256;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Tunables for one crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Number of fetch workers, i.e. the most requests in flight at once.
    pub workers: usize,
    /// How many discoveries the frontier buffers before workers block.
    pub frontier_capacity: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            frontier_capacity: DEFAULT_FRONTIER_CAPACITY,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("site-mapper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CrawlConfig {
    /// Rejects settings the spider cannot run with.
    ///
    /// tokio channels panic on a zero capacity, so both sizes must be at least 1.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(CrawlError::InvalidConfig(
                "workers must be greater than 0".to_string(),
            ));
        }
        if self.frontier_capacity == 0 {
            return Err(CrawlError::InvalidConfig(
                "frontier_capacity must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(CrawlError::InvalidConfig(
                "request timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads a TOML file and layers it over the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content)?;
        let mut config = Self::default();
        if let Some(crawl) = file.crawl {
            crawl.apply(&mut config);
        }
        Ok(config)
    }
}

// Mirrors the file layout; every key is optional.
#[derive(Debug, Deserialize)]
struct FileConfig {
    crawl: Option<CrawlSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CrawlSection {
    workers: Option<usize>,
    frontier_capacity: Option<usize>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

impl CrawlSection {
    fn apply(self, config: &mut CrawlConfig) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(capacity) = self.frontier_capacity {
            config.frontier_capacity = capacity;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CrawlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert!(config.user_agent.starts_with("site-mapper/"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = CrawlConfig {
            workers: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_frontier_rejected() {
        let config = CrawlConfig {
            frontier_capacity: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = CrawlConfig::from_toml(
            r#"
            [crawl]
            workers = 3
            request_timeout_secs = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.frontier_capacity, DEFAULT_FRONTIER_CAPACITY);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = CrawlConfig::from_toml("").unwrap();
        assert_eq!(config, CrawlConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = CrawlConfig::from_toml("[crawl]\nthreads = 4\n");
        assert!(matches!(result, Err(CrawlError::Config(_))));
    }
}
