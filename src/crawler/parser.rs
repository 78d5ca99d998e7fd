//! HTML parser for extracting links
//!
//! Links are collected from the elements that reference other resources:
//! `a[href]`, `img[src]`, `script[src]`, `link[href]` and `iframe[src]`.
//! Parsing is lenient; malformed markup never fails, it just yields fewer links.

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Prefixes of hrefs that never point at a fetchable resource
const IGNORED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// The element a link was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkSource {
    Anchor,
    Image,
    Script,
    Link,
    Iframe,
}

impl LinkSource {
    /// Selector and URL attribute for every link source
    const ALL: [(LinkSource, &'static str, &'static str); 5] = [
        (LinkSource::Anchor, "a[href]", "href"),
        (LinkSource::Image, "img[src]", "src"),
        (LinkSource::Script, "script[src]", "src"),
        (LinkSource::Link, "link[href]", "href"),
        (LinkSource::Iframe, "iframe[src]", "src"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anchor => "a",
            Self::Image => "img",
            Self::Script => "script",
            Self::Link => "link",
            Self::Iframe => "iframe",
        }
    }
}

impl fmt::Display for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link found on a page, resolved to an absolute URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: Url,
    pub source: LinkSource,
}

/// Extracts every resource link from an HTML document
///
/// Relative links are resolved against `base_url`. Each absolute URL is
/// returned once, tagged with the first element it was found on.
///
/// # Example
///
/// ```
/// use website_checker::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/page">Page</a><img src="logo.png">"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].url.as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (source, selector, attribute) in LinkSource::ALL {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(raw) = element.value().attr(attribute) else {
                continue;
            };

            if let Some(url) = resolve_link(raw, base_url) {
                if seen.insert(url.as_str().to_string()) {
                    links.push(DiscoveredLink { url, source });
                }
            }
        }
    }

    links
}

/// Resolves an href or src value to an absolute URL
///
/// Returns None if the link should be excluded:
/// - empty values and fragment-only links
/// - javascript:, mailto:, tel: and data: URIs
/// - values that cannot be resolved
fn resolve_link(raw: &str, base_url: &Url) -> Option<Url> {
    let raw = raw.trim();

    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if IGNORED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return None;
    }

    base_url.join(raw).ok()
}
