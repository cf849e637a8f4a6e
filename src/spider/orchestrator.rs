// src/spider/orchestrator.rs
// =============================================================================
// The orchestrator: the one task that owns a crawl's state.
//
// How it works:
// 1. The seed URL is marked seen, added to the tree and queued for dispatch
// 2. A fixed pool of workers takes URLs from the job queue and fetches them
// 3. Workers send discoveries back over the frontier (a bounded channel)
// 4. For each discovery: skip it if its path was seen, otherwise mark it
//    seen, add it to the tree and queue it for dispatch
// 5. Repeat until stop() is called
//
// Only this task touches the seen-set and the tree, so neither needs a lock.
// Everything else talks to it through channels.
//
// Shutdown order matters. Closing the frontier while a worker is still
// sending into it would lose or fault that send, so we:
//   cancel -> join every worker -> close the frontier -> drain what's buffered
//
// Rust concepts:
// - tokio::select!: wait on several channels at once
// - mpsc: many workers send, one orchestrator receives
// - Owned state: CrawlState is moved into the task, nobody else can reach it
// =============================================================================

use super::worker::{JobQueue, Worker};
use crate::config::CrawlConfig;
use crate::fetch::links::is_same_host;
use crate::fetch::Fetch;
use crate::site::SiteTree;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// What workers put on the frontier.
#[derive(Debug)]
pub(super) enum Event {
    /// A same-host link found on a page
    Discovered(Url),
    /// A worker is done with one URL; all of that URL's discoveries were sent
    /// before this
    Finished,
}

/// Requests from the Spider handle to the running crawl.
#[derive(Debug)]
pub(super) enum Command {
    Snapshot(oneshot::Sender<SiteTree>),
}

/// The receiving ends the crawl task listens on.
pub(super) struct Control {
    pub(super) stop: oneshot::Receiver<()>,
    pub(super) commands: mpsc::Receiver<Command>,
    pub(super) idle: watch::Sender<bool>,
}

// Everything only the orchestrator may mutate
struct CrawlState {
    root: Url,
    tree: SiteTree,
    seen: HashSet<String>,
    // Seen URLs waiting for a free worker
    pending: VecDeque<Url>,
    // Dispatched URLs whose Finished marker hasn't arrived yet
    outstanding: usize,
}

impl CrawlState {
    fn new(root: Url) -> Self {
        let host = root.host_str().unwrap_or_default().to_string();
        Self {
            root,
            tree: SiteTree::new(host),
            seen: HashSet::new(),
            pending: VecDeque::new(),
            outstanding: 0,
        }
    }

    // The seen-check / mark / insert step. Returns true if the URL is new.
    fn discover(&mut self, url: Url) -> bool {
        if !is_same_host(&self.root, &url) {
            return false;
        }

        let key = path_key(&url);
        if !self.seen.insert(key) {
            return false;
        }

        self.tree.add(url.path());
        self.pending.push_back(url);
        true
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::Discovered(url) => {
                self.discover(url);
            }
            Event::Finished => self.outstanding = self.outstanding.saturating_sub(1),
        }
    }

    // Nothing in flight and nothing waiting: the reachable site is exhausted
    fn is_idle(&self) -> bool {
        self.outstanding == 0 && self.pending.is_empty()
    }
}

// "/a", "/a/" and "/a?page=2" are one node in the tree, so they are one fetch
fn path_key(url: &Url) -> String {
    url.path().trim_matches('/').to_string()
}

/// Runs one crawl to completion and returns its tree.
pub(super) async fn run(
    seed: Url,
    config: CrawlConfig,
    fetcher: Arc<dyn Fetch>,
    cancel: CancellationToken,
    control: Control,
) -> SiteTree {
    let Control {
        mut stop,
        mut commands,
        idle,
    } = control;

    let (frontier_tx, mut frontier) = mpsc::channel::<Event>(config.frontier_capacity);
    let (jobs_tx, jobs_rx) = mpsc::channel::<Url>(config.workers);
    let jobs: JobQueue = Arc::new(Mutex::new(jobs_rx));

    let mut workers = JoinSet::new();
    for id in 0..config.workers {
        let worker = Worker {
            id,
            fetcher: Arc::clone(&fetcher),
            jobs: Arc::clone(&jobs),
            frontier: frontier_tx.clone(),
            cancel: cancel.clone(),
        };
        workers.spawn(worker.run());
    }
    // Only workers may hold senders, so the frontier closes once they're gone
    drop(frontier_tx);

    let mut state = CrawlState::new(seed.clone());
    state.discover(seed);
    info!(root = %state.root, workers = config.workers, "crawl started");

    loop {
        idle.send_if_modified(|current| {
            let now = state.is_idle();
            let changed = *current != now;
            *current = now;
            changed
        });

        tokio::select! {
            biased;

            // Err means the Spider handle was dropped: stop as well
            _ = &mut stop => break,

            Some(command) = commands.recv() => match command {
                Command::Snapshot(reply) => {
                    let _ = reply.send(state.tree.clone());
                }
            },

            Some(event) = frontier.recv() => state.apply(event),

            permit = jobs_tx.reserve(), if !state.pending.is_empty() => match permit {
                Ok(permit) => {
                    if let Some(url) = state.pending.pop_front() {
                        debug!(%url, "dispatching");
                        permit.send(url);
                        state.outstanding += 1;
                    }
                }
                // Every worker is gone; nothing more can be fetched
                Err(_) => break,
            },
        }
    }

    info!(root = %state.root, "stopping crawl");
    shut_down(&mut state, &cancel, jobs_tx, &mut workers, &mut frontier).await;

    idle.send_replace(true);
    info!(
        root = %state.root,
        pages = state.seen.len(),
        nodes = state.tree.node_count(),
        "crawl stopped"
    );

    state.tree
}

// cancel -> join -> close -> drain. After this returns no worker is running
// and every discovery that made it onto the frontier is in the tree.
async fn shut_down(
    state: &mut CrawlState,
    cancel: &CancellationToken,
    jobs: mpsc::Sender<Url>,
    workers: &mut JoinSet<()>,
    frontier: &mut mpsc::Receiver<Event>,
) {
    // 1. Cut short whatever is in flight
    cancel.cancel();
    drop(jobs);

    // 2. Wait for every worker to finish, so nobody can send anymore
    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "fetch worker ended abnormally");
        }
    }

    // 3. Fold in what workers sent before they noticed the cancellation
    drain(state, frontier);
}

// Closes the frontier and applies whatever is still buffered in it
fn drain(state: &mut CrawlState, frontier: &mut mpsc::Receiver<Event>) {
    frontier.close();
    let mut drained = 0;
    while let Ok(event) = frontier.try_recv() {
        state.apply(event);
        drained += 1;
    }
    debug!(root = %state.root, drained, "frontier drained");
}
