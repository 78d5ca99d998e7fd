//! Crawl-scoped robots.txt cache
//!
//! Each origin gets one `OnceCell`. The map lock is held only long enough to
//! find or create the cell, so concurrent misses for the same origin wait on
//! a single fetch instead of issuing their own.

use crate::robots::ParsedRobots;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

type Slot = Arc<OnceCell<Arc<ParsedRobots>>>;

/// Maps an origin to its robots.txt rules
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, Slot>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rules for `origin`, running `load` on the first miss
    ///
    /// `load` runs at most once per origin for the lifetime of the cache.
    pub async fn get_or_load<F, Fut>(&self, origin: &str, load: F) -> Arc<ParsedRobots>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ParsedRobots>,
    {
        let slot = {
            let mut entries = self.entries.lock().await;
            entries.entry(origin.to_string()).or_default().clone()
        };

        slot.get_or_init(|| async { Arc::new(load().await) })
            .await
            .clone()
    }
}
