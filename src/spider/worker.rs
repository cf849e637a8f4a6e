// src/spider/worker.rs
// =============================================================================
// Fetch workers.
//
// A crawl runs a fixed number of these. Each one loops:
// 1. take the next URL from the shared job queue
// 2. fetch it
// 3. push every discovered link onto the frontier, then a Finished marker
//
// Workers never touch the seen-set or the tree. They stop when the
// cancellation token fires or the job queue closes. A fetch that panics is
// logged and counted as finished; the worker carries on with the next job.
// =============================================================================

use super::orchestrator::Event;
use crate::fetch::Fetch;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use url::Url;

/// Jobs are shared by every worker; whoever holds the lock gets the next URL.
pub(super) type JobQueue = Arc<Mutex<mpsc::Receiver<Url>>>;

pub(super) struct Worker {
    pub(super) id: usize,
    pub(super) fetcher: Arc<dyn Fetch>,
    pub(super) jobs: JobQueue,
    pub(super) frontier: mpsc::Sender<Event>,
    pub(super) cancel: CancellationToken,
}

impl Worker {
    pub(super) async fn run(self) {
        loop {
            let job = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                job = next_job(&self.jobs) => job,
            };

            let Some(url) = job else {
                break;
            };
            self.visit(url).await;
        }
        debug!(worker = self.id, "worker stopped");
    }

    async fn visit(&self, url: Url) {
        debug!(worker = self.id, %url, "fetching");

        // A panicking fetcher must still produce a Finished marker, or the
        // orchestrator would count this URL as in flight forever
        let fetched = AssertUnwindSafe(self.fetcher.fetch(&url, &self.cancel))
            .catch_unwind()
            .await;

        match fetched {
            Ok(Ok(links)) => {
                for link in links {
                    if !self.emit(Event::Discovered(link)).await {
                        return;
                    }
                }
            }
            // A broken page only loses its own links; the crawl goes on
            Ok(Err(err)) => warn!(%url, error = %err, "fetch failed"),
            Err(_) => error!(worker = self.id, %url, "fetcher panicked"),
        }

        self.emit(Event::Finished).await;
    }

    // Blocks while the frontier is full. Returns false once the crawl is being
    // torn down, at which point whatever we were holding is dropped.
    async fn emit(&self, event: Event) -> bool {
        tokio::select! {
            biased;
            sent = self.frontier.send(event) => sent.is_ok(),
            _ = self.cancel.cancelled() => false,
        }
    }
}

async fn next_job(jobs: &Mutex<mpsc::Receiver<Url>>) -> Option<Url> {
    jobs.lock().await.recv().await
}
