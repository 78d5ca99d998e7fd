//! Robots.txt handling module
//!
//! This module fetches, parses, and caches robots.txt per origin and answers
//! whether a URL may be fetched. An origin whose robots.txt cannot be fetched
//! (network error, timeout, or any non-200 status) is treated as allow-all.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{product_token, ParsedRobots};

use crate::url::origin_of;
use crate::CrawlError;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Timeout for a single robots.txt request
pub const ROBOTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Decides whether URLs may be fetched under their origin's robots.txt
///
/// Each origin's robots.txt is fetched at most once per gate.
#[derive(Debug)]
pub struct RobotsGate {
    client: Client,
    user_agent: String,
    enabled: bool,
    cache: RobotsCache,
    fetches: AtomicUsize,
}

impl RobotsGate {
    /// Creates a gate that fetches robots.txt with `client`
    ///
    /// When `enabled` is false every URL is allowed and nothing is fetched.
    pub fn new(client: Client, user_agent: impl Into<String>, enabled: bool) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            enabled,
            cache: RobotsCache::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Returns true if `url` may be fetched
    pub async fn is_allowed(&self, url: &Url) -> bool {
        if !self.enabled {
            return true;
        }

        let origin = origin_of(url);
        let rules = self
            .cache
            .get_or_load(&origin, || self.load(&origin))
            .await;

        rules.is_allowed(url.as_str(), &self.user_agent)
    }

    /// Number of robots.txt requests issued so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    async fn load(&self, origin: &str) -> ParsedRobots {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        match fetch_robots(&self.client, origin).await {
            Ok(rules) => {
                debug!("Loaded robots.txt for {}", origin);
                rules
            }
            Err(e) => {
                debug!("{}; allowing all URLs", e);
                ParsedRobots::allow_all()
            }
        }
    }
}

/// Fetches robots.txt for an origin
///
/// # Arguments
///
/// * `client` - HTTP client carrying the crawl's user agent and headers; it
///   should follow redirects so a moved robots.txt is still honored
/// * `origin` - `scheme://host[:port]` of the site
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - robots.txt was served with status 200
/// * `Err(CrawlError::RobotsUnavailable)` - any other outcome
pub async fn fetch_robots(client: &Client, origin: &str) -> Result<ParsedRobots, CrawlError> {
    let robots_url = format!("{}/robots.txt", origin);
    let unavailable = |reason: String| CrawlError::RobotsUnavailable {
        origin: origin.to_string(),
        reason,
    };

    let response = client
        .get(&robots_url)
        .timeout(ROBOTS_TIMEOUT)
        .send()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(unavailable(format!("HTTP {}", status.as_u16())));
    }

    let body = response
        .text()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    Ok(ParsedRobots::from_content(&body))
}
