// src/spider/mod.rs
// =============================================================================
// This module runs crawls.
//
// A Spider is a handle to one crawl. Its life is one-way:
//
//   Idle --start()--> Running --stop()--> Stopping --> Stopped
//
// start() returns as soon as the crawl task is spawned. stop() cancels
// in-flight requests, waits for every worker to exit and hands back the
// finished tree. A Spider is single-use: once started it can't be started
// again.
//
// Submodules:
// - seed: validates the URL a crawl starts from
// - orchestrator: the single task that owns the seen-set and the tree
// - worker: the fixed pool of fetch workers
// =============================================================================

mod orchestrator;
mod seed;
mod worker;

pub use seed::parse_seed;

use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::site::SiteTree;
use orchestrator::{Command, Control};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

/// Where a Spider is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiderStatus {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Handle to a single crawl.
pub struct Spider {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetch>,
    state: State,
}

enum State {
    Idle,
    Running(Running),
    Stopping(Url),
    Stopped { seed: Url, tree: SiteTree },
}

// The handle's side of every channel into the crawl task
struct Running {
    seed: Url,
    stop: oneshot::Sender<()>,
    commands: mpsc::Sender<Command>,
    idle: watch::Receiver<bool>,
    task: JoinHandle<SiteTree>,
}

impl Spider {
    /// Creates an idle spider that fetches over HTTP.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates an idle spider that fetches with `fetcher`.
    pub fn with_fetcher(config: CrawlConfig, fetcher: Arc<dyn Fetch>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            state: State::Idle,
        })
    }

    /// Validates `seed` and starts crawling it in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, seed: &str) -> Result<()> {
        if !matches!(self.state, State::Idle) {
            return Err(CrawlError::AlreadyRunning);
        }
        let seed = parse_seed(seed)?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let (commands_tx, commands_rx) = mpsc::channel(8);
        let (idle_tx, idle_rx) = watch::channel(false);

        let control = Control {
            stop: stop_rx,
            commands: commands_rx,
            idle: idle_tx,
        };
        let task = tokio::spawn(orchestrator::run(
            seed.clone(),
            self.config.clone(),
            Arc::clone(&self.fetcher),
            CancellationToken::new(),
            control,
        ));

        info!(%seed, "spider started");
        self.state = State::Running(Running {
            seed,
            stop: stop_tx,
            commands: commands_tx,
            idle: idle_rx,
            task,
        });
        Ok(())
    }

    /// Stops the crawl and returns the finished tree.
    ///
    /// Returns only after every fetch worker has exited and the frontier has
    /// been drained into the tree.
    pub async fn stop(&mut self) -> Result<SiteTree> {
        let running = match std::mem::replace(&mut self.state, State::Idle) {
            State::Running(running) => running,
            other => {
                self.state = other;
                return Err(CrawlError::NotRunning);
            }
        };

        let Running {
            seed, stop, task, ..
        } = running;
        self.state = State::Stopping(seed.clone());

        // The crawl may already have ended on its own; that's fine
        let _ = stop.send(());
        let tree = task.await?;

        info!(%seed, nodes = tree.node_count(), "spider stopped");
        self.state = State::Stopped {
            seed,
            tree: tree.clone(),
        };
        Ok(tree)
    }

    /// The tree so far.
    ///
    /// While running this is a point-in-time copy taken by the crawl task
    /// itself. Only after stop() is it final.
    pub async fn tree(&self) -> SiteTree {
        match &self.state {
            State::Idle => SiteTree::default(),
            State::Stopping(seed) => SiteTree::new(seed.host_str().unwrap_or_default()),
            State::Stopped { tree, .. } => tree.clone(),
            State::Running(running) => {
                let (reply, answer) = oneshot::channel();
                let asked = running.commands.send(Command::Snapshot(reply)).await;
                match (asked, answer.await) {
                    (Ok(()), Ok(tree)) => tree,
                    _ => SiteTree::new(running.seed.host_str().unwrap_or_default()),
                }
            }
        }
    }

    /// Resolves once nothing is left to fetch: every reachable page has been
    /// visited. The crawl keeps running until stop() is called.
    pub async fn wait_idle(&self) -> Result<()> {
        let State::Running(running) = &self.state else {
            return Err(CrawlError::NotRunning);
        };

        let mut idle = running.idle.clone();
        // Err: the crawl task is gone, which is as idle as it gets
        let _ = idle.wait_for(|idle| *idle).await;
        Ok(())
    }

    pub fn status(&self) -> SpiderStatus {
        match self.state {
            State::Idle => SpiderStatus::Idle,
            State::Running(_) => SpiderStatus::Running,
            State::Stopping(_) => SpiderStatus::Stopping,
            State::Stopped { .. } => SpiderStatus::Stopped,
        }
    }

    /// The validated seed, once started.
    pub fn seed(&self) -> Option<&Url> {
        match &self.state {
            State::Idle => None,
            State::Running(running) => Some(&running.seed),
            State::Stopping(seed) | State::Stopped { seed, .. } => Some(seed),
        }
    }
}

impl fmt::Debug for Spider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spider")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("seed", &self.seed().map(Url::as_str))
            .finish()
    }
}
