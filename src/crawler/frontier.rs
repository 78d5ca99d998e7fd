//! Crawl frontier: the shared breadth-first work queue
//!
//! The frontier owns the queue of pending entries together with the queued
//! and visited sets, all behind one lock so that admission and push happen
//! atomically, and so do dequeue and mark-visited.
//!
//! Termination is tracked with an outstanding-work counter: it grows by one
//! for every accepted entry and shrinks by one when a worker reports the
//! entry finished. Workers waiting on an empty queue are woken through a
//! `Notify` whenever new work arrives, the counter reaches zero, or the
//! frontier is closed.

use crate::crawler::parser::LinkSource;
use std::collections::{HashSet, VecDeque};
use tokio::sync::{Mutex, Notify};
use tracing::trace;

/// Where a frontier entry was discovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// The link as written in the parent page, resolved to an absolute URL
    pub raw_url: String,

    /// The page the link was found on
    pub parent_url: String,

    /// The element that produced the link
    pub link_source: LinkSource,
}

/// A unit of work in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL, also the visited/queued key
    pub url: String,

    /// Link distance from the start URL
    pub depth: u32,

    /// None for the seed
    pub discovered_from: Option<Discovery>,
}

impl FrontierEntry {
    /// Creates the depth-0 seed entry
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
            discovered_from: None,
        }
    }

    /// Creates an entry for a link found on a page
    pub fn discovered(url: impl Into<String>, depth: u32, discovery: Discovery) -> Self {
        Self {
            url: url.into(),
            depth,
            discovered_from: Some(discovery),
        }
    }
}

/// Result of offering an entry to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Entry was queued
    Accepted,

    /// URL is already queued or visited
    AlreadySeen,

    /// Entry depth exceeds the configured maximum
    TooDeep,

    /// visited + queued already equals the URL budget
    BudgetExhausted,

    /// The frontier was closed by cancellation
    Closed,
}

impl EnqueueOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Point-in-time counts, used for progress reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierSnapshot {
    pub visited: usize,
    pub queued: usize,
    pub outstanding: usize,
    pub budget_rejections: usize,
    pub closed: bool,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    outstanding: usize,
    budget_rejections: usize,
    closed: bool,
}

/// Bounded FIFO work queue shared by all workers
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
    max_urls: usize,
    max_depth: u32,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_urls` - Upper bound on visited + queued URLs
    /// * `max_depth` - Entries deeper than this are rejected
    pub fn new(max_urls: usize, max_depth: u32) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
            max_urls,
            max_depth,
        }
    }

    /// Offers an entry to the frontier
    ///
    /// The entry is queued only if its URL is neither queued nor visited, its
    /// depth is within bounds, and the URL budget has room.
    pub async fn enqueue(&self, entry: FrontierEntry) -> EnqueueOutcome {
        let outcome = {
            let mut state = self.state.lock().await;

            if state.closed {
                EnqueueOutcome::Closed
            } else if state.visited.contains(&entry.url) || state.queued.contains(&entry.url) {
                EnqueueOutcome::AlreadySeen
            } else if entry.depth > self.max_depth {
                EnqueueOutcome::TooDeep
            } else if state.visited.len() + state.queued.len() >= self.max_urls {
                state.budget_rejections += 1;
                EnqueueOutcome::BudgetExhausted
            } else {
                state.queued.insert(entry.url.clone());
                state.queue.push_back(entry.clone());
                state.outstanding += 1;
                EnqueueOutcome::Accepted
            }
        };

        trace!("Enqueue {} (depth {}): {:?}", entry.url, entry.depth, outcome);

        if outcome.is_accepted() {
            self.notify.notify_waiters();
        }
        outcome
    }

    /// Takes the next entry, waiting while other workers may still add work
    ///
    /// The entry's URL moves from the queued set into the visited set in the
    /// same critical section. Returns `None` once the frontier is drained or
    /// closed.
    pub async fn dequeue(&self) -> Option<FrontierEntry> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);

            {
                let mut state = self.state.lock().await;
                if state.closed {
                    return None;
                }

                if let Some(entry) = state.queue.pop_front() {
                    state.queued.remove(&entry.url);
                    state.visited.insert(entry.url.clone());
                    return Some(entry);
                }

                if state.outstanding == 0 {
                    return None;
                }

                // Register before releasing the lock so no wake-up is lost
                notified.as_mut().enable();
            }

            notified.await;
        }
    }

    /// Marks one dequeued entry as fully processed
    ///
    /// Must be called exactly once per entry returned by `dequeue`, after any
    /// links found on it have been enqueued.
    pub async fn complete(&self) {
        let drained = {
            let mut state = self.state.lock().await;
            state.outstanding = state.outstanding.saturating_sub(1);
            state.outstanding == 0
        };

        if drained {
            self.notify.notify_waiters();
        }
    }

    /// Stops all further dequeues and enqueues
    pub async fn close(&self) {
        self.state.lock().await.closed = true;
        self.notify.notify_waiters();
    }

    /// True when the queue is empty and nothing is in flight
    pub async fn is_drained(&self) -> bool {
        let state = self.state.lock().await;
        state.queue.is_empty() && state.outstanding == 0
    }

    pub async fn snapshot(&self) -> FrontierSnapshot {
        let state = self.state.lock().await;
        FrontierSnapshot {
            visited: state.visited.len(),
            queued: state.queued.len(),
            outstanding: state.outstanding,
            budget_rejections: state.budget_rejections,
            closed: state.closed,
        }
    }

    pub fn max_urls(&self) -> usize {
        self.max_urls
    }
}
