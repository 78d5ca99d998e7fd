//! Fetch workers
//!
//! Each worker loops on the shared frontier: dequeue an entry, check
//! robots.txt, fetch, emit a record, deduplicate, and (when the mode policy
//! allows) extract links and enqueue the admitted ones one level deeper.
//! The loop ends when the frontier reports it is drained or closed.

use crate::crawler::dedup::{ContentDedupIndex, DedupVerdict};
use crate::crawler::fetcher::{fetch_url, FetchError, FetchedPage};
use crate::crawler::frontier::{Discovery, EnqueueOutcome, Frontier, FrontierEntry};
use crate::crawler::parser::extract_links;
use crate::crawler::policy::ModePolicy;
use crate::output::{
    CrawlProgress, ErrorKind, ProgressSink, ResourceError, ResourceRecord, ResourceSink,
};
use crate::robots::RobotsGate;
use crate::state::{ResourceStatus, WorkerState, WorkerTracker};
use crate::url::{extract_domain, normalize_url};
use crate::CrawlError;
use reqwest::Client;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use url::Url;

/// Counters aggregated into the crawl summary
#[derive(Debug, Default)]
pub(crate) struct CrawlStats {
    pub records_emitted: AtomicU64,
    pub succeeded: AtomicU64,
    pub failed: AtomicU64,
    pub duplicates: AtomicU64,
    pub robots_blocked: AtomicU64,
    pub invalid_urls: AtomicU64,
    pub bytes_downloaded: AtomicU64,
    pub max_depth_seen: AtomicU32,
}

/// State shared by every worker of one crawl
pub(crate) struct CrawlShared {
    pub client: Client,
    pub start_url: String,
    pub frontier: Frontier,
    pub robots: RobotsGate,
    pub dedup: ContentDedupIndex,
    pub policy: ModePolicy,
    pub sink: Arc<dyn ResourceSink>,
    pub progress: Option<Arc<dyn ProgressSink>>,
    pub stats: CrawlStats,
    pub busy: Arc<AtomicUsize>,
}

impl CrawlShared {
    /// Hands a record to the sink; sink failures are logged, never propagated
    fn emit(&self, record: &ResourceRecord) {
        if let Err(e) = self.sink.record(record) {
            warn!("Failed to record {}: {}", record.normalized_url, e);
        }
        self.stats.records_emitted.fetch_add(1, Ordering::Relaxed);
        self.stats
            .max_depth_seen
            .fetch_max(record.depth, Ordering::Relaxed);
    }

    async fn report_progress(&self) {
        let Some(progress) = &self.progress else {
            return;
        };

        let snapshot = self.frontier.snapshot().await;
        progress.on_progress(&CrawlProgress {
            visited: snapshot.visited,
            queued: snapshot.queued,
            in_flight: self.busy.load(Ordering::SeqCst),
            max_urls: self.frontier.max_urls(),
            records_emitted: self.stats.records_emitted.load(Ordering::Relaxed),
            bytes_downloaded: self.stats.bytes_downloaded.load(Ordering::Relaxed),
        });
    }

    /// Record skeleton for a dequeued entry
    fn base_record(&self, entry: &FrontierEntry, url: &Url) -> ResourceRecord {
        let (raw_url, parent_url, link_source) = match &entry.discovered_from {
            Some(d) => (
                d.raw_url.clone(),
                Some(d.parent_url.clone()),
                Some(d.link_source),
            ),
            None => (self.start_url.clone(), None, None),
        };

        ResourceRecord {
            url: raw_url,
            normalized_url: entry.url.clone(),
            final_url: None,
            depth: entry.depth,
            domain: extract_domain(url).unwrap_or_default(),
            is_external: self.policy.is_external(url),
            status_code: None,
            status: ResourceStatus::Ok,
            resource_type: self.policy.resource_type(url, None),
            byte_length: 0,
            mime_type: None,
            fetch_duration: Duration::ZERO,
            content_hash: None,
            is_duplicate: false,
            canonical_url: None,
            parent_url,
            link_source,
            error: None,
        }
    }
}

/// Runs one worker until the frontier is drained or closed
pub(crate) async fn run_worker(id: usize, shared: Arc<CrawlShared>) {
    let mut tracker = WorkerTracker::new(id, shared.busy.clone());
    debug!("Worker {} started", id);

    while let Some(entry) = shared.frontier.dequeue().await {
        if let Err(e) = process_entry(&shared, &mut tracker, &entry).await {
            warn!("Worker {} failed on {}: {}", id, entry.url, e);
        }
        if tracker.state().is_busy() {
            if let Err(e) = tracker.transition(WorkerState::Idle) {
                warn!("Worker {}: {}", id, e);
            }
        }

        shared.frontier.complete().await;
        shared.report_progress().await;
    }

    if let Err(e) = tracker.transition(WorkerState::Stopped) {
        warn!("Worker {}: {}", id, e);
    }
    debug!("Worker {} stopped", id);
}

/// Processes one dequeued entry; returns only on worker state errors
async fn process_entry(
    shared: &CrawlShared,
    tracker: &mut WorkerTracker,
    entry: &FrontierEntry,
) -> Result<(), CrawlError> {
    tracker.transition(WorkerState::Fetching)?;
    debug!("Processing {} (depth {})", entry.url, entry.depth);

    let url = match Url::parse(&entry.url) {
        Ok(url) => url,
        Err(e) => {
            shared.stats.invalid_urls.fetch_add(1, Ordering::Relaxed);
            debug!("Skipping unparseable frontier URL {}: {}", entry.url, e);
            return tracker.transition(WorkerState::Idle);
        }
    };

    if !shared.robots.is_allowed(&url).await {
        debug!("URL {} disallowed by robots.txt", url);
        let mut record = shared.base_record(entry, &url);
        record.status = ResourceStatus::Blocked;
        record.error = Some(ResourceError {
            kind: ErrorKind::RobotsDisallowed,
            message: "Disallowed by robots.txt".to_string(),
        });
        shared.emit(&record);
        shared.stats.robots_blocked.fetch_add(1, Ordering::Relaxed);
        return tracker.transition(WorkerState::Idle);
    }

    let started = Instant::now();
    let result = fetch_url(&shared.client, &url).await;
    let elapsed = started.elapsed();

    let page = match result {
        Ok(page) => page,
        Err(e) => {
            debug!("Fetch failed for {}: {}", url, e);
            let record = failure_record(shared, entry, &url, &e, elapsed);
            shared.emit(&record);
            shared.stats.failed.fetch_add(1, Ordering::Relaxed);
            return tracker.transition(WorkerState::Idle);
        }
    };

    let verdict = shared.dedup.check(&entry.url, &page.body).await;
    let is_html = shared
        .policy
        .is_html(&page.final_url, page.mime_type.as_deref());

    let record = success_record(shared, entry, &url, &page, &verdict, elapsed);
    shared.emit(&record);
    shared.stats.succeeded.fetch_add(1, Ordering::Relaxed);
    shared
        .stats
        .bytes_downloaded
        .fetch_add(page.byte_length(), Ordering::Relaxed);

    if let DedupVerdict::Duplicate { canonical, .. } = &verdict {
        debug!("{} duplicates {}; not expanding", entry.url, canonical);
        shared.stats.duplicates.fetch_add(1, Ordering::Relaxed);
        return tracker.transition(WorkerState::Idle);
    }

    if !shared.policy.should_extract_links(entry.depth, is_html) {
        return tracker.transition(WorkerState::Idle);
    }

    tracker.transition(WorkerState::Extracting)?;
    enqueue_links(shared, entry, &url, &page).await;
    tracker.transition(WorkerState::Idle)
}

/// Extracts links from a page and offers the admitted ones to the frontier
async fn enqueue_links(shared: &CrawlShared, entry: &FrontierEntry, url: &Url, page: &FetchedPage) {
    let html = String::from_utf8_lossy(&page.body);
    let links = extract_links(&html, url);
    let next_depth = entry.depth + 1;
    let mut accepted = 0usize;

    for link in links {
        let candidate = match normalize_url(link.url.as_str()) {
            Ok(candidate) => candidate,
            Err(e) => {
                shared.stats.invalid_urls.fetch_add(1, Ordering::Relaxed);
                trace!("Dropping {}: {}", link.url, e);
                continue;
            }
        };

        if let Err(reason) = shared.policy.admission(&candidate) {
            trace!("Dropping {}: {}", candidate, reason);
            continue;
        }

        let discovery = Discovery {
            raw_url: link.url.to_string(),
            parent_url: entry.url.clone(),
            link_source: link.source,
        };
        let outcome = shared
            .frontier
            .enqueue(FrontierEntry::discovered(
                candidate.to_string(),
                next_depth,
                discovery,
            ))
            .await;

        if outcome == EnqueueOutcome::Accepted {
            accepted += 1;
        }
    }

    debug!("{}: {} new URLs queued", entry.url, accepted);
}

fn success_record(
    shared: &CrawlShared,
    entry: &FrontierEntry,
    url: &Url,
    page: &FetchedPage,
    verdict: &DedupVerdict,
    elapsed: Duration,
) -> ResourceRecord {
    let mut record = shared.base_record(entry, url);
    let redirected = page.was_redirected(url);

    record.final_url = redirected.then(|| page.final_url.to_string());
    record.status_code = Some(page.status);
    record.status = if redirected {
        ResourceStatus::Redirected
    } else {
        ResourceStatus::Ok
    };
    record.resource_type = shared
        .policy
        .resource_type(&page.final_url, page.mime_type.as_deref());
    record.byte_length = page.byte_length();
    record.mime_type = page.mime_type.clone();
    record.fetch_duration = elapsed;
    record.content_hash = Some(verdict.hash().to_string());
    record.is_duplicate = verdict.is_duplicate();
    record.canonical_url = verdict.canonical().map(str::to_string);
    record
}

fn failure_record(
    shared: &CrawlShared,
    entry: &FrontierEntry,
    url: &Url,
    error: &FetchError,
    elapsed: Duration,
) -> ResourceRecord {
    let mut record = shared.base_record(entry, url);

    record.status_code = error.status();
    record.status = error.resource_status();
    record.fetch_duration = elapsed;
    record.error = Some(ResourceError {
        kind: error.kind(),
        message: error.to_string(),
    });

    if let FetchError::Status {
        final_url,
        mime_type,
        bytes,
        ..
    } = error
    {
        if final_url != &entry.url {
            record.final_url = Some(final_url.clone());
        }
        record.resource_type = shared.policy.resource_type(url, mime_type.as_deref());
        record.mime_type = mime_type.clone();
        record.byte_length = *bytes;
    }

    record
}
