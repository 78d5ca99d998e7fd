/// Resource status definitions
///
/// Every resource the crawler emits a record for ends in exactly one of these states.
use std::fmt;

/// Outcome of visiting a single resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    // ===== Success States =====
    /// Resource was fetched with a 2xx status at the requested URL
    Ok,

    /// Resource was served from a different URL after redirects, or the
    /// server answered with a 3xx status that was not followed
    Redirected,

    // ===== Error States =====
    /// Server answered 404 or 410
    NotFound,

    /// The request timed out
    Timeout,

    /// Any other failure (connection, TLS, body read, non-success status)
    Error,

    // ===== Skip States =====
    /// robots.txt disallows the resource; it was never fetched
    Blocked,
}

impl ResourceStatus {
    /// Returns true if the resource body was received successfully
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Redirected)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::NotFound | Self::Timeout | Self::Error)
    }

    /// Returns true if the resource was skipped without a request
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Classifies an HTTP status code that did not produce a usable body
    pub fn from_http_failure(status: u16) -> Self {
        match status {
            300..=399 => Self::Redirected,
            404 | 410 => Self::NotFound,
            _ => Self::Error,
        }
    }

    /// Converts the status to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Redirected => "redirected",
            Self::NotFound => "not_found",
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::Blocked => "blocked",
        }
    }

    /// Parses a status from a database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "ok" => Some(Self::Ok),
            "redirected" => Some(Self::Redirected),
            "not_found" => Some(Self::NotFound),
            "timeout" => Some(Self::Timeout),
            "error" => Some(Self::Error),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Ok,
            Self::Redirected,
            Self::NotFound,
            Self::Timeout,
            Self::Error,
            Self::Blocked,
        ]
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
