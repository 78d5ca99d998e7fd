//! In-memory sinks
//!
//! `MemorySink` and `MemoryProgress` collect everything the engine emits so
//! callers can inspect it after the crawl. `DiscardSink` keeps nothing, for
//! runs where only the summary matters.

use crate::output::traits::{CrawlProgress, OutputResult, ProgressSink, ResourceRecord, ResourceSink};
use crate::state::ResourceStatus;
use std::sync::{Mutex, MutexGuard};

/// Collects every record in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ResourceRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all records received so far
    pub fn records(&self) -> Vec<ResourceRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Finds the record for a normalized URL
    pub fn find(&self, normalized_url: &str) -> Option<ResourceRecord> {
        self.lock()
            .iter()
            .find(|r| r.normalized_url == normalized_url)
            .cloned()
    }

    pub fn count_by_status(&self, status: ResourceStatus) -> usize {
        self.lock().iter().filter(|r| r.status == status).count()
    }

    // Records are append-only, so a poisoned lock still holds valid data
    fn lock(&self) -> MutexGuard<'_, Vec<ResourceRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResourceSink for MemorySink {
    fn record(&self, record: &ResourceRecord) -> OutputResult<()> {
        self.lock().push(record.clone());
        Ok(())
    }
}

/// Drops every record
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl ResourceSink for DiscardSink {
    fn record(&self, _record: &ResourceRecord) -> OutputResult<()> {
        Ok(())
    }
}

/// Collects every progress update
#[derive(Debug, Default)]
pub struct MemoryProgress {
    updates: Mutex<Vec<CrawlProgress>>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<CrawlProgress> {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<CrawlProgress> {
        self.updates().last().copied()
    }
}

impl ProgressSink for MemoryProgress {
    fn on_progress(&self, progress: &CrawlProgress) {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(*progress);
    }
}
