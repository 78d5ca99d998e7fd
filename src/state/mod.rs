//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ResourceStatus`: The outcome recorded for each visited resource
//! - `WorkerState`: The lifecycle of a fetch worker (idle, fetching, extracting, stopped)

mod resource_status;
mod worker_state;

// Re-export main types
pub use resource_status::ResourceStatus;
pub use worker_state::{WorkerState, WorkerTracker};
