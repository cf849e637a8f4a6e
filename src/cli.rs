// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every crawl setting can also come from an environment variable
// (SITE_MAPPER_WORKERS, ...) or from a TOML file passed with --config.
// Flags win over the file, the file wins over the built-in defaults.
// =============================================================================

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use site_mapper::CrawlConfig;
use std::path::PathBuf;
use std::time::Duration;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "site-mapper",
    version,
    about = "Map every same-host page of a website into a site tree",
    long_about = "site-mapper follows every link from a starting URL that stays on the same host, \
                  then prints the discovered paths as a sorted tree."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl one or more websites and print their site trees
    ///
    /// Example: site-mapper crawl https://example.com --duration 30
    Crawl {
        /// Website URLs to crawl (a missing scheme means http://)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Stop after this many seconds even if pages are left
        ///
        /// Without it the crawl runs until the site is exhausted or Ctrl-C
        #[arg(long)]
        duration: Option<u64>,

        /// Output results in JSON format instead of a tree
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        settings: CrawlSettings,
    },
}

/// Crawl tuning flags shared by every crawl in one run
#[derive(Args, Debug, Default)]
pub struct CrawlSettings {
    /// TOML file with a [crawl] table
    #[arg(long, env = "SITE_MAPPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of concurrent fetch workers per crawl
    #[arg(long, env = "SITE_MAPPER_WORKERS")]
    pub workers: Option<usize>,

    /// How many discovered links may wait in the frontier
    #[arg(long, env = "SITE_MAPPER_FRONTIER_CAPACITY")]
    pub frontier_capacity: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", env = "SITE_MAPPER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, env = "SITE_MAPPER_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl CrawlSettings {
    // Layers: defaults < config file < flags/env
    pub fn resolve(&self) -> Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => CrawlConfig::default(),
        };

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(capacity) = self.frontier_capacity {
            config.frontier_capacity = capacity;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crawl_command() {
        let cli = Cli::try_parse_from([
            "site-mapper",
            "crawl",
            "https://example.com",
            "example.org",
            "--json",
            "--workers",
            "3",
        ])
        .unwrap();

        let Commands::Crawl {
            urls,
            json,
            duration,
            settings,
        } = cli.command;
        assert_eq!(urls, vec!["https://example.com", "example.org"]);
        assert!(json);
        assert_eq!(duration, None);
        assert_eq!(settings.workers, Some(3));
    }

    #[test]
    fn test_crawl_requires_url() {
        assert!(Cli::try_parse_from(["site-mapper", "crawl"]).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let settings = CrawlSettings {
            workers: Some(2),
            timeout_secs: Some(3),
            ..CrawlSettings::default()
        };
        let config = settings.resolve().unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(
            config.frontier_capacity,
            CrawlConfig::default().frontier_capacity
        );
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let settings = CrawlSettings {
            workers: Some(0),
            ..CrawlSettings::default()
        };
        assert!(settings.resolve().is_err());
    }
}
