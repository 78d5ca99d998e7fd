//! Progress logging

use crate::output::traits::{CrawlProgress, ProgressSink};
use std::time::Instant;

/// Logs a progress line every `every` emitted records
#[derive(Debug)]
pub struct TracingProgress {
    every: u64,
    started: Instant,
}

impl TracingProgress {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            started: Instant::now(),
        }
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressSink for TracingProgress {
    fn on_progress(&self, progress: &CrawlProgress) {
        if progress.records_emitted == 0 || progress.records_emitted % self.every != 0 {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            progress.records_emitted as f64 / elapsed
        } else {
            0.0
        };

        tracing::info!(
            "Progress: {}/{} URLs visited, {} queued, {} in flight, {:.2} resources/sec, {} KiB downloaded",
            progress.visited,
            progress.max_urls,
            progress.queued,
            progress.in_flight,
            rate,
            progress.bytes_downloaded / 1024
        );
    }
}
