//! Output module: where crawl results go
//!
//! This module handles:
//! - The `ResourceSink` and `ProgressSink` interfaces the engine writes to
//! - In-memory, discarding and SQLite sinks
//! - Progress logging and markdown crawl summaries

mod markdown;
mod memory;
mod progress;
mod sqlite_output;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use memory::{DiscardSink, MemoryProgress, MemorySink};
pub use progress::TracingProgress;
pub use sqlite_output::SqliteSink;
pub use traits::{
    CrawlProgress, CrawlSummary, ErrorKind, OutputError, OutputResult, ProgressSink,
    ResourceError, ResourceRecord, ResourceSink, ResourceType, TerminationReason,
};
