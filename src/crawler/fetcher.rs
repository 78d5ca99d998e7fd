//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler:
//! - Building the HTTP client from the crawl configuration
//! - GET requests with the configured timeout, redirect and TLS settings
//! - Error classification into the kinds recorded on each resource

use crate::config::CrawlConfig;
use crate::output::ErrorKind;
use crate::state::ResourceStatus;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, ClientBuilder};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Upper bound on the TCP/TLS connect phase
const MAX_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Redirect hops allowed for robots.txt, independent of the page setting
pub const ROBOTS_MAX_REDIRECTS: usize = 5;

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the body was served from, after redirects
    pub final_url: Url,

    /// HTTP status code (always 2xx)
    pub status: u16,

    /// MIME type from the Content-Type header, without parameters
    pub mime_type: Option<String>,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Returns true if the request was redirected to a different URL
    pub fn was_redirected(&self, requested: &Url) -> bool {
        self.final_url != *requested
    }

    pub fn byte_length(&self) -> u64 {
        self.body.len() as u64
    }
}

/// Errors produced while fetching one resource
///
/// These never abort the crawl; each one becomes a failure record.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Redirect error for {url}: {message}")]
    Redirect { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: u16,
        final_url: String,
        mime_type: Option<String>,
        bytes: u64,
    },

    #[error("Failed to read body of {url}: {message}")]
    Body {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// Classifies a transport-level reqwest error
    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_redirect() {
            Self::Redirect {
                url,
                message: error.to_string(),
            }
        } else if error.is_connect() {
            Self::Connect {
                url,
                message: error.to_string(),
            }
        } else {
            Self::Request {
                url,
                message: error.to_string(),
            }
        }
    }

    /// The kind recorded on the failure record
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Connect { .. } => ErrorKind::Connection,
            Self::Redirect { .. } => ErrorKind::Redirect,
            Self::Status { status, .. } if (300..400).contains(status) => ErrorKind::Redirect,
            Self::Status { .. } => ErrorKind::HttpStatus,
            Self::Body { .. } => ErrorKind::Body,
            Self::Request { .. } => ErrorKind::Request,
        }
    }

    /// The resource status recorded for this failure
    pub fn resource_status(&self) -> ResourceStatus {
        match self {
            Self::Timeout { .. } => ResourceStatus::Timeout,
            Self::Status { status, .. } => ResourceStatus::from_http_failure(*status),
            _ => ResourceStatus::Error,
        }
    }

    /// HTTP status, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Body { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Builds the HTTP client used for page requests
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use website_checker::config::CrawlConfig;
/// use website_checker::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    let redirect = if config.follow_redirects {
        Policy::limited(config.max_redirects)
    } else {
        Policy::none()
    };

    base_client(config).redirect(redirect).build()
}

/// Builds the HTTP client used for robots.txt requests
///
/// Shares the user agent, headers and TLS settings of the page client but
/// always follows up to [`ROBOTS_MAX_REDIRECTS`] redirects, so sites that
/// redirect robots.txt to a canonical host keep their rules enforced.
pub fn build_robots_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    base_client(config)
        .redirect(Policy::limited(ROBOTS_MAX_REDIRECTS))
        .build()
}

fn base_client(config: &CrawlConfig) -> ClientBuilder {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(custom_headers(config))
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(
            config.timeout.min(MAX_CONNECT_TIMEOUT_SECS),
        ))
        .danger_accept_invalid_certs(!config.verify_tls)
        .gzip(true)
        .brotli(true)
}

fn custom_headers(config: &CrawlConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.custom_headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Ignoring invalid custom header '{}'", name),
        }
    }
    headers
}

/// Fetches a URL with a single GET request
///
/// # Response Handling
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(FetchedPage)` |
/// | Any other status | `FetchError::Status` (body length still measured) |
/// | Timeout | `FetchError::Timeout` |
/// | Too many redirects | `FetchError::Redirect` |
/// | Connection refused, DNS, TLS | `FetchError::Connect` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    let final_url = response.url().clone();
    let mime_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(mime_essence);

    if !status.is_success() {
        let bytes = response.bytes().await.map(|b| b.len() as u64).unwrap_or(0);
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            final_url: final_url.to_string(),
            mime_type,
            bytes,
        });
    }

    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                status: status.as_u16(),
                message: e.to_string(),
            }
        }
    })?;

    Ok(FetchedPage {
        final_url,
        status: status.as_u16(),
        mime_type,
        body: body.to_vec(),
    })
}

/// Strips parameters from a Content-Type value
fn mime_essence(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    if essence.is_empty() {
        None
    } else {
        Some(essence)
    }
}
