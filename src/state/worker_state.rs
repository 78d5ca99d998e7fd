/// Worker lifecycle definitions
///
/// A fetch worker cycles `Idle -> Fetching -> Extracting -> Idle` and ends in
/// `Stopped` once the frontier is drained or closed.
use crate::CrawlError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Current activity of one fetch worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting on the frontier
    Idle,

    /// Checking robots.txt and fetching the resource
    Fetching,

    /// Parsing the body and enqueueing admitted links
    Extracting,

    /// Exited; no further transitions
    Stopped,
}

impl WorkerState {
    /// Returns true while the worker holds a dequeued entry
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Fetching | Self::Extracting)
    }

    /// Returns true if `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Fetching)
                | (Self::Idle, Self::Stopped)
                | (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Idle)
                | (Self::Extracting, Self::Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one worker's state and the pool-wide count of busy workers
#[derive(Debug)]
pub struct WorkerTracker {
    id: usize,
    state: WorkerState,
    busy: Arc<AtomicUsize>,
}

impl WorkerTracker {
    /// Creates an idle tracker sharing `busy` with the rest of the pool
    pub fn new(id: usize, busy: Arc<AtomicUsize>) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            busy,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Moves the worker to `next`, keeping the busy count in step
    pub fn transition(&mut self, next: WorkerState) -> Result<(), CrawlError> {
        if !self.state.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        match (self.state.is_busy(), next.is_busy()) {
            (false, true) => {
                self.busy.fetch_add(1, Ordering::SeqCst);
            }
            (true, false) => {
                self.busy.fetch_sub(1, Ordering::SeqCst);
            }
            _ => {}
        }

        self.state = next;
        Ok(())
    }
}
