//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator is the only task that touches crawl state: the visited
//! set, the page signatures and the sitemap. Workers talk to it through
//! bounded channels, so no locks are needed.
//!
//! The loop never blocks. It drains discovered URLs and finished pages as
//! they arrive, and when nothing is waiting (or a status interval has passed)
//! it checks for stalled progress and the termination conditions.

use crate::config::CrawlSettings;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::worker::{WorkerChannels, WorkerPool};
use crate::state::{Page, Sitemap};
use crate::url::check_domain;
use crate::Result;
use flume::{Sender, TrySendError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

/// Status checks without a new page before the crawl counts as stalled
const MAX_STALLED_CHECKS: u32 = 7;

/// Channel slots per worker for tasks, discoveries and pages
const CHANNEL_SLOTS_PER_WORKER: usize = 10;

/// Pause between polls while no message is waiting
const IDLE_POLL: Duration = Duration::from_millis(5);

/// Why a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The sitemap reached the page budget
    PageBudget,
    /// The time budget ran out
    TimeBudget,
    /// No new page arrived for too many status checks
    Stalled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::PageBudget => "page budget reached",
            StopReason::TimeBudget => "time budget exhausted",
            StopReason::Stalled => "no new pages found",
        };
        write!(f, "{}", s)
    }
}

/// Everything a finished crawl hands back
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Accepted pages in acceptance order
    pub sitemap: Sitemap,

    /// Distinct URLs dispatched to workers
    pub visited: usize,

    /// Wall time from seeding to the end of the worker join
    pub elapsed: Duration,

    pub reason: StopReason,
}

/// Counts status checks during which the sitemap did not grow
///
/// Checks happen at most once per interval, measured on the monotonic clock.
#[derive(Debug)]
struct StallTracker {
    interval: Duration,
    last_check: Instant,
    last_count: usize,
    stalled: u32,
}

impl StallTracker {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_check: Instant::now(),
            last_count: 0,
            stalled: 0,
        }
    }

    fn is_due(&self) -> bool {
        self.last_check.elapsed() >= self.interval
    }

    /// Records `count` if a check is due; returns whether one happened
    fn observe(&mut self, count: usize) -> bool {
        if !self.is_due() {
            return false;
        }

        self.last_check = Instant::now();
        if count == self.last_count {
            self.stalled += 1;
        } else {
            self.stalled = 0;
            self.last_count = count;
        }
        true
    }

    fn stalled(&self) -> u32 {
        self.stalled
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    settings: CrawlSettings,
    visited: HashSet<String>,
    signatures: HashMap<String, Vec<String>>,
    sitemap: Sitemap,
    backlog: VecDeque<String>,
    started: Instant,
    status: StallTracker,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `settings` - Validated crawl settings
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The domain reference is unusable
    pub fn new(mut settings: CrawlSettings) -> Result<Self> {
        check_domain(&mut settings.domain)?;

        let sitemap = Sitemap::with_capacity(settings.page_budget);
        let status = StallTracker::new(settings.status_interval);

        Ok(Self {
            settings,
            visited: HashSet::new(),
            signatures: HashMap::new(),
            sitemap,
            backlog: VecDeque::new(),
            started: Instant::now(),
            status,
        })
    }

    /// Marks the starting URL visited and queues it for dispatch
    pub fn seed(&mut self) -> bool {
        let start = self.settings.start_url();
        self.accept_url(start)
    }

    /// Queues a discovered URL for dispatch unless it was seen before
    ///
    /// A URL counts as visited from the moment it is accepted here, so it is
    /// never handed to two workers even while its first fetch is running.
    pub fn accept_url(&mut self, url: String) -> bool {
        if self.visited.contains(&url) {
            return false;
        }

        tracing::debug!("Dispatching {}", url);
        self.visited.insert(url.clone());
        self.backlog.push_back(url);
        true
    }

    /// Adds a finished page to the sitemap if there is room and its asset
    /// signature is new
    pub fn accept_page(&mut self, page: Page) -> bool {
        if self.sitemap.is_full() {
            tracing::debug!("Sitemap full, dropping {}", page.url);
            return false;
        }

        let signature = page.signature();
        if self.signatures.contains_key(&signature) {
            tracing::debug!("Duplicate asset signature, dropping {}", page.url);
            return false;
        }

        let url = page.url.clone();
        let children = page.children.clone();
        if self.sitemap.push(page).is_err() {
            return false;
        }
        self.signatures.insert(signature, children);

        tracing::info!(
            "Collected {} ({}/{})",
            url,
            self.sitemap.len(),
            self.sitemap.capacity()
        );
        true
    }

    /// Returns the termination condition that currently holds, if any
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.sitemap.len() >= self.settings.page_budget {
            Some(StopReason::PageBudget)
        } else if self.started.elapsed() >= self.settings.time_budget {
            Some(StopReason::TimeBudget)
        } else if self.status.stalled() > MAX_STALLED_CHECKS {
            Some(StopReason::Stalled)
        } else {
            None
        }
    }

    /// Runs a status check if one is due
    pub fn check_status(&mut self) {
        if self.status.observe(self.sitemap.len()) {
            tracing::debug!(
                "Status: {} pages collected, {} URLs visited, {} waiting for dispatch, stalled {}",
                self.sitemap.len(),
                self.visited.len(),
                self.backlog.len(),
                self.status.stalled()
            );
        }
    }

    /// Number of distinct URLs accepted for dispatch
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// URLs accepted but not yet handed to the task channel
    pub fn pending_dispatch(&self) -> usize {
        self.backlog.len()
    }

    pub fn sitemap(&self) -> &Sitemap {
        &self.sitemap
    }

    /// Moves queued URLs into the task channel without waiting
    fn flush_backlog(&mut self, tasks: &Sender<String>) {
        while let Some(url) = self.backlog.pop_front() {
            match tasks.try_send(url) {
                Ok(()) => {}
                Err(TrySendError::Full(url)) => {
                    self.backlog.push_front(url);
                    break;
                }
                Err(TrySendError::Disconnected(url)) => {
                    tracing::warn!("Task channel closed, cannot dispatch {}", url);
                    break;
                }
            }
        }
    }

    /// Runs the crawl to completion
    ///
    /// 1. Spawn the worker pool and seed the starting URL
    /// 2. Drain discovered URLs and finished pages, deduplicating both
    /// 3. Check status and termination whenever idle or a status check is due
    /// 4. Drop queued work, signal every worker, join the pool, return the
    ///    sitemap
    ///
    /// Only client construction can fail once the coordinator exists;
    /// errors on individual URLs are absorbed by the workers.
    pub async fn run(mut self) -> Result<CrawlOutcome> {
        let slots = self.settings.workers * CHANNEL_SLOTS_PER_WORKER;
        let (task_tx, task_rx) = flume::bounded(slots);
        let (discovered_tx, discovered_rx) = flume::bounded(slots);
        let (page_tx, page_rx) = flume::bounded(slots);

        let client = build_http_client(&self.settings)?;
        let pool = WorkerPool::spawn(
            self.settings.workers,
            &client,
            &self.settings.domain,
            self.settings.request_timeout,
            WorkerChannels {
                tasks: task_rx.clone(),
                discovered: discovered_tx,
                pages: page_tx,
            },
        );

        tracing::info!(
            "Starting crawl of {} with {} workers (max {} pages, {:?})",
            self.settings.start_url(),
            pool.len(),
            self.settings.page_budget,
            self.settings.time_budget
        );

        self.started = Instant::now();
        self.status = StallTracker::new(self.settings.status_interval);
        self.seed();

        let reason = loop {
            self.flush_backlog(&task_tx);

            let mut drained = false;
            if let Ok(url) = discovered_rx.try_recv() {
                self.accept_url(url);
                drained = true;
            }
            if let Ok(page) = page_rx.try_recv() {
                self.accept_page(page);
                drained = true;
            }

            if drained && !self.status.is_due() {
                tokio::task::yield_now().await;
                continue;
            }

            self.check_status();
            if let Some(reason) = self.stop_reason() {
                break reason;
            }

            if !drained {
                tokio::time::sleep(IDLE_POLL).await;
            }
        };

        tracing::info!(
            "Terminating crawl ({}): {} pages collected, {} URLs visited in {:?}",
            reason,
            self.sitemap.len(),
            self.visited.len(),
            self.started.elapsed()
        );

        // Queued work is abandoned. With the result conduits closed,
        // in-flight publishes and deliveries fail at once.
        self.backlog.clear();
        let abandoned = task_rx.drain().count();
        drop(discovered_rx);
        drop(page_rx);
        tracing::debug!("Abandoned {} queued URLs", abandoned);

        let joined = pool.shutdown().await;
        tracing::debug!("Joined {} workers", joined);

        drop(task_tx);

        Ok(CrawlOutcome {
            visited: self.visited.len(),
            elapsed: self.started.elapsed(),
            sitemap: self.sitemap,
            reason,
        })
    }
}

/// Runs a complete crawl with the given settings
///
/// # Example
///
/// ```no_run
/// use petit_crawl::config::{validate, Config};
/// use petit_crawl::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawl.url = "http://example.com".to_string();
/// let outcome = run_crawl(validate(&config)?).await?;
/// println!("{} pages", outcome.sitemap.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(settings: CrawlSettings) -> Result<CrawlOutcome> {
    Coordinator::new(settings)?.run().await
}
