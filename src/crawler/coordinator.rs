//! Crawl coordinator
//!
//! The `CrawlEngine` owns every piece of crawl-scoped state. `run` validates
//! the start URL and policy, seeds the frontier, launches a fixed pool of
//! workers, and waits for them to drain the frontier (or for cancellation).

use crate::config::{validate_crawl_config, CrawlConfig};
use crate::crawler::dedup::ContentDedupIndex;
use crate::crawler::fetcher::{build_http_client, build_robots_client};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::policy::ModePolicy;
use crate::crawler::worker::{run_worker, CrawlShared, CrawlStats};
use crate::output::{CrawlSummary, ProgressSink, ResourceSink, TerminationReason};
use crate::robots::RobotsGate;
use crate::url::{extract_domain, normalize_url};
use crate::{Result, UrlError};
use chrono::Utc;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs crawls for one configuration
pub struct CrawlEngine {
    config: CrawlConfig,
    client: Client,
    robots_client: Client,
    sink: Arc<dyn ResourceSink>,
    progress: Option<Arc<dyn ProgressSink>>,
    cancel: CancellationToken,
    config_hash: Option<String>,
}

impl CrawlEngine {
    /// Creates an engine, validating the configuration up front
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Config` for out-of-range values or patterns that
    /// do not compile, and `CrawlError::HttpClient` if the HTTP client cannot
    /// be built.
    pub fn new(config: CrawlConfig, sink: Arc<dyn ResourceSink>) -> Result<Self> {
        validate_crawl_config(&config)?;
        let client = build_http_client(&config)?;
        let robots_client = build_robots_client(&config)?;

        Ok(Self {
            config,
            client,
            robots_client,
            sink,
            progress: None,
            cancel: CancellationToken::new(),
            config_hash: None,
        })
    }

    /// Sends progress updates to `progress` after every processed URL
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Attaches the configuration hash reported in the summary
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Token that stops the crawl when cancelled
    ///
    /// Cancelling stops further dequeues; requests already in flight finish
    /// (bounded by their timeout) and the pool then exits.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawls from `start_url` until the frontier is drained or the crawl is
    /// cancelled
    ///
    /// # Errors
    ///
    /// Only fails before any worker starts: for an invalid start URL or an
    /// invalid mode policy. Per-URL failures become records; cancellation
    /// still returns a summary.
    pub async fn run(&self, start_url: &str) -> Result<CrawlSummary> {
        let started_at = Utc::now();
        let timer = Instant::now();

        let start = normalize_url(start_url)?;
        let base_domain = extract_domain(&start).ok_or(UrlError::MissingDomain)?;
        let policy = ModePolicy::new(&self.config, &base_domain)?;
        let worker_count = self.config.effective_worker_count();

        tracing::info!(
            "Starting {} crawl of {} ({} workers, max {} URLs, max depth {})",
            self.config.mode,
            start,
            worker_count,
            self.config.max_urls,
            self.config.max_depth
        );
        if let Some(hash) = &self.config_hash {
            tracing::info!("Config hash: {}", hash);
        }

        let shared = Arc::new(CrawlShared {
            client: self.client.clone(),
            start_url: start_url.trim().to_string(),
            frontier: Frontier::new(self.config.max_urls, self.config.max_depth),
            robots: RobotsGate::new(
                self.robots_client.clone(),
                self.config.user_agent.clone(),
                self.config.respect_robots_txt,
            ),
            dedup: ContentDedupIndex::new(),
            policy,
            sink: self.sink.clone(),
            progress: self.progress.clone(),
            stats: CrawlStats::default(),
            busy: Arc::new(AtomicUsize::new(0)),
        });

        shared
            .frontier
            .enqueue(FrontierEntry::seed(start.to_string()))
            .await;

        if self.cancel.is_cancelled() {
            shared.frontier.close().await;
        }

        let watcher = {
            let token = self.cancel.clone();
            let shared = shared.clone();
            tokio::spawn(async move {
                token.cancelled().await;
                tracing::info!("Crawl cancelled; stopping workers");
                shared.frontier.close().await;
            })
        };

        let mut pool = JoinSet::new();
        for id in 0..worker_count {
            pool.spawn(run_worker(id, shared.clone()));
        }

        let mut aborted = false;
        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task failed: {}", e);
                aborted = true;
                // Release workers waiting on work the failed task will never complete
                shared.frontier.close().await;
            }
        }
        watcher.abort();

        let snapshot = shared.frontier.snapshot().await;
        let termination = if self.cancel.is_cancelled() {
            TerminationReason::Cancelled
        } else if aborted {
            TerminationReason::Aborted
        } else if snapshot.budget_rejections > 0 {
            TerminationReason::LimitReached
        } else {
            TerminationReason::Completed
        };

        let stats = &shared.stats;
        let summary = CrawlSummary {
            start_url: start_url.to_string(),
            normalized_start_url: start.to_string(),
            base_domain,
            mode: self.config.mode,
            started_at,
            finished_at: Utc::now(),
            duration: timer.elapsed(),
            termination,
            config_hash: self.config_hash.clone(),
            worker_count,
            visited: snapshot.visited,
            queued_remaining: snapshot.queued,
            budget_rejections: snapshot.budget_rejections,
            records_emitted: stats.records_emitted.load(Ordering::Relaxed),
            succeeded: stats.succeeded.load(Ordering::Relaxed),
            failed: stats.failed.load(Ordering::Relaxed),
            duplicates: stats.duplicates.load(Ordering::Relaxed),
            robots_blocked: stats.robots_blocked.load(Ordering::Relaxed),
            invalid_urls: stats.invalid_urls.load(Ordering::Relaxed),
            bytes_downloaded: stats.bytes_downloaded.load(Ordering::Relaxed),
            max_depth_seen: stats.max_depth_seen.load(Ordering::Relaxed),
        };

        tracing::info!(
            "Crawl {}: {} resources recorded ({} failed, {} duplicates, {} blocked) in {:?}",
            summary.termination,
            summary.records_emitted,
            summary.failed,
            summary.duplicates,
            summary.robots_blocked,
            summary.duration
        );

        Ok(summary)
    }
}

/// Runs a complete crawl with a fresh engine
///
/// # Arguments
///
/// * `start_url` - Where the crawl begins (scheme optional)
/// * `config` - The crawl configuration
/// * `sink` - Receives one record per visited resource
pub async fn run_crawl(
    start_url: &str,
    config: CrawlConfig,
    sink: Arc<dyn ResourceSink>,
) -> Result<CrawlSummary> {
    CrawlEngine::new(config, sink)?.run(start_url).await
}
