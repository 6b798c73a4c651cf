//! Worker tasks and the pool that owns them
//!
//! A worker waits for either a URL to crawl or a shutdown signal, whichever
//! comes first. Fetch errors never stop a worker; only a shutdown signal (or
//! the coordinator going away) does.

use crate::crawler::fetcher::fetch_page;
use crate::state::Page;
use crate::url::DomainRef;
use flume::{Receiver, Sender};
use reqwest::Client;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Bound on handing a finished page to the coordinator
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on requesting one page, retry included
pub const FETCH_DEADLINE: Duration = Duration::from_secs(5);

/// Channel ends shared by every worker of a pool
#[derive(Clone)]
pub struct WorkerChannels {
    /// URLs to crawl, sent by the coordinator
    pub tasks: Receiver<String>,

    /// Child URLs found while walking a page
    pub discovered: Sender<String>,

    /// Finished pages
    pub pages: Sender<Page>,
}

/// One long-lived crawl task
pub struct Worker {
    id: usize,
    client: Client,
    domain: DomainRef,
    channels: WorkerChannels,
    shutdown: Receiver<()>,
    fetch_deadline: Duration,
    delivery_timeout: Duration,
}

impl Worker {
    pub fn new(
        id: usize,
        client: Client,
        domain: DomainRef,
        channels: WorkerChannels,
        shutdown: Receiver<()>,
    ) -> Self {
        Self {
            id,
            client,
            domain,
            channels,
            shutdown,
            fetch_deadline: FETCH_DEADLINE,
            delivery_timeout: DELIVERY_TIMEOUT,
        }
    }

    /// Overrides how long one page request may take
    pub fn with_fetch_deadline(mut self, deadline: Duration) -> Self {
        self.fetch_deadline = deadline;
        self
    }

    /// Overrides how long a finished page may wait for the coordinator
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Runs until a shutdown signal arrives
    pub async fn run(mut self) {
        tracing::debug!("Worker {} started", self.id);

        loop {
            tokio::select! {
                _ = self.shutdown.recv_async() => break,
                task = self.channels.tasks.recv_async() => match task {
                    Ok(url) => self.crawl(url).await,
                    // The coordinator dropped the task inflow
                    Err(_) => break,
                },
            }
        }

        tracing::debug!("Worker {} stopped", self.id);
    }

    /// Fetches one URL and delivers the page, if there is one
    async fn crawl(&mut self, url: String) {
        let discovered = &self.channels.discovered;
        let fetched = fetch_page(
            &self.client,
            &url,
            &mut self.domain,
            discovered,
            self.fetch_deadline,
        )
        .await;

        match fetched {
            Ok(page) => {
                self.deliver(page).await;
            }
            Err(e) => tracing::debug!("Worker {} skipped {}: {}", self.id, url, e),
        }
    }

    /// Hands a page to the coordinator, dropping it if that takes too long
    ///
    /// Returns true if the page was delivered.
    async fn deliver(&self, page: Page) -> bool {
        let url = page.url.clone();
        let delivery = self.channels.pages.send_async(page);
        match tokio::time::timeout(self.delivery_timeout, delivery).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                tracing::debug!("Worker {}: coordinator gone, dropping {}", self.id, url);
                false
            }
            Err(_) => {
                tracing::debug!(
                    "Worker {}: page outflow full for {:?}, dropping {}",
                    self.id,
                    self.delivery_timeout,
                    url
                );
                false
            }
        }
    }
}

/// A fixed set of workers plus the shutdown broadcast that stops them
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown: Sender<()>,
}

impl WorkerPool {
    /// Spawns `count` workers on the tokio runtime
    ///
    /// The shutdown channel holds one slot per worker so that signalling
    /// every worker never blocks. Each page request is bounded by
    /// `fetch_deadline`.
    pub fn spawn(
        count: usize,
        client: &Client,
        domain: &DomainRef,
        fetch_deadline: Duration,
        channels: WorkerChannels,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = flume::bounded(count);

        let handles = (0..count)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    client.clone(),
                    domain.clone(),
                    channels.clone(),
                    shutdown_rx.clone(),
                )
                .with_fetch_deadline(fetch_deadline);
                tokio::spawn(worker.run())
            })
            .collect();

        Self {
            handles,
            shutdown: shutdown_tx,
        }
    }

    /// Number of workers in the pool
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Sends one shutdown signal per worker and waits for all of them
    ///
    /// Returns the number of workers that exited cleanly.
    pub async fn shutdown(self) -> usize {
        for _ in 0..self.handles.len() {
            if self.shutdown.send_async(()).await.is_err() {
                break;
            }
        }

        let mut joined = 0;
        for handle in self.handles {
            match handle.await {
                Ok(()) => joined += 1,
                Err(e) => tracing::warn!("Worker task failed: {}", e),
            }
        }

        joined
    }
}
