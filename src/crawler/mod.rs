//! Crawler module: the crawl engine
//!
//! This module contains the core crawling logic, including:
//! - The bounded breadth-first frontier
//! - Content deduplication
//! - Per-mode extraction and admission policy
//! - HTTP fetching and HTML link extraction
//! - The worker pool and overall crawl coordination

mod coordinator;
mod dedup;
mod fetcher;
mod frontier;
mod parser;
mod policy;
mod worker;

pub use coordinator::{run_crawl, CrawlEngine};
pub use dedup::{fingerprint, ContentDedupIndex, DedupVerdict};
pub use fetcher::{
    build_http_client, build_robots_client, fetch_url, FetchError, FetchedPage,
    ROBOTS_MAX_REDIRECTS,
};
pub use frontier::{Discovery, EnqueueOutcome, Frontier, FrontierEntry, FrontierSnapshot};
pub use parser::{extract_links, DiscoveredLink, LinkSource};
pub use policy::{ModePolicy, Rejection};
