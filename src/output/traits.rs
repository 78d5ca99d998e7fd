//! Output traits and types
//!
//! This module defines the interfaces the crawl engine writes to, the
//! per-resource record, and the summary returned when a crawl ends.

use crate::config::CrawlMode;
use crate::crawler::LinkSource;
use crate::state::ResourceStatus;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Broad class of a fetched resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Html,
    Css,
    Javascript,
    Image,
    Font,
    Document,
    Other,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Javascript => "javascript",
            Self::Image => "image",
            Self::Font => "font",
            Self::Document => "document",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a per-resource failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    Connection,
    Redirect,
    HttpStatus,
    Body,
    Request,
    RobotsDisallowed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Redirect => "redirect",
            Self::HttpStatus => "http_status",
            Self::Body => "body",
            Self::Request => "request",
            Self::RobotsDisallowed => "robots_disallowed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error attached to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Metadata for one visited resource
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    /// URL as discovered (absolute, before normalization)
    pub url: String,

    /// Normalized URL, the crawl's identity for this resource
    pub normalized_url: String,

    /// URL the body was served from, when it differs from `normalized_url`
    pub final_url: Option<String>,

    /// Link distance from the start URL
    pub depth: u32,

    pub domain: String,

    /// True if the resource is not on the start URL's domain
    pub is_external: bool,

    /// HTTP status code, if a response was received
    pub status_code: Option<u16>,

    pub status: ResourceStatus,

    pub resource_type: ResourceType,

    /// Response body length in bytes
    pub byte_length: u64,

    pub mime_type: Option<String>,

    pub fetch_duration: Duration,

    /// 128-bit content fingerprint (hex), for successful fetches
    pub content_hash: Option<String>,

    /// True if an identical body was already seen at `canonical_url`
    pub is_duplicate: bool,

    pub canonical_url: Option<String>,

    /// Page the link was found on; None for the start URL
    pub parent_url: Option<String>,

    /// Element the link was found on; None for the start URL
    pub link_source: Option<LinkSource>,

    pub error: Option<ResourceError>,
}

impl ResourceRecord {
    /// Returns true if the fetch failed or was blocked
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Point-in-time crawl counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlProgress {
    pub visited: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub max_urls: usize,
    pub records_emitted: u64,
    pub bytes_downloaded: u64,
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// Every reachable admitted URL was visited
    Completed,

    /// The frontier drained after rejecting links for lack of URL budget
    LimitReached,

    /// The crawl was cancelled before the frontier drained
    Cancelled,

    /// A worker task failed and the remaining workers were stopped
    Aborted,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::LimitReached => "limit_reached",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics for a crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub start_url: String,
    pub normalized_start_url: String,
    pub base_domain: String,
    pub mode: CrawlMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,
    pub termination: TerminationReason,
    pub config_hash: Option<String>,
    pub worker_count: usize,

    // Frontier counts
    pub visited: usize,
    pub queued_remaining: usize,
    pub budget_rejections: usize,

    // Record breakdown
    pub records_emitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub duplicates: u64,
    pub robots_blocked: u64,
    pub invalid_urls: u64,
    pub bytes_downloaded: u64,
    pub max_depth_seen: u32,
}

impl CrawlSummary {
    /// Returns the success rate as a percentage of emitted records
    pub fn success_rate(&self) -> f64 {
        if self.records_emitted == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.records_emitted as f64) * 100.0
    }

    /// Returns the error rate as a percentage of emitted records
    pub fn error_rate(&self) -> f64 {
        if self.records_emitted == 0 {
            return 0.0;
        }
        (self.failed as f64 / self.records_emitted as f64) * 100.0
    }
}

/// Receives one record per visited resource
///
/// Called concurrently from every worker; implementations must be thread-safe.
/// A failing sink is logged and never aborts the crawl.
pub trait ResourceSink: Send + Sync {
    /// Records a visited resource
    ///
    /// # Arguments
    ///
    /// * `record` - Metadata for the resource
    fn record(&self, record: &ResourceRecord) -> OutputResult<()>;
}

/// Receives progress updates as resources complete
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: &CrawlProgress);
}
