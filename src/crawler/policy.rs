//! Per-mode crawl policy
//!
//! Two decisions are made here: whether links should be extracted from a
//! fetched resource, and whether a discovered link is admitted to the
//! frontier. Patterns are compiled once when the policy is built.

use crate::config::{compile_pattern, validate_crawl_config, CrawlConfig, CrawlMode};
use crate::output::ResourceType;
use crate::url::{extract_domain, path_extension};
use crate::ConfigResult;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;
use url::Url;

/// Pattern used in REGEX mode when none is configured
const MATCH_ANYTHING: &str = ".*";

/// Why a discovered link was not admitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnsupportedScheme,
    ExternalDomain,
    SkippedExtension(String),
    OutsidePath,
    RegexFilter,
    Excluded,
    NotIncluded,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedScheme => write!(f, "unsupported scheme"),
            Self::ExternalDomain => write!(f, "external domain"),
            Self::SkippedExtension(ext) => write!(f, "skipped extension .{}", ext),
            Self::OutsidePath => write!(f, "outside path restriction"),
            Self::RegexFilter => write!(f, "rejected by regex filter"),
            Self::Excluded => write!(f, "matches an exclude pattern"),
            Self::NotIncluded => write!(f, "matches no include pattern"),
        }
    }
}

/// Compiled mode policy for one crawl
#[derive(Debug, Clone)]
pub struct ModePolicy {
    mode: CrawlMode,
    max_depth: u32,
    base_domain: String,
    follow_external_links: bool,
    skip_extensions: BTreeSet<String>,
    html_extensions: BTreeSet<String>,
    path_restriction: String,
    regex: Option<Regex>,
    regex_is_inclusive: bool,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl ModePolicy {
    /// Builds the policy for a crawl rooted at `base_domain`
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration is out of range or any
    /// pattern fails to compile.
    pub fn new(config: &CrawlConfig, base_domain: &str) -> ConfigResult<Self> {
        validate_crawl_config(config)?;

        let regex = if config.mode == CrawlMode::Regex {
            let pattern = match config.regex_pattern.as_deref() {
                Some(pattern) => pattern,
                None => {
                    warn!("REGEX mode without regex-pattern; admitting every URL");
                    MATCH_ANYTHING
                }
            };
            Some(compile_pattern(pattern)?)
        } else {
            None
        };

        let include = config
            .include_patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<ConfigResult<Vec<_>>>()?;
        let exclude = config
            .exclude_patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            mode: config.mode,
            max_depth: config.max_depth,
            base_domain: base_domain.to_lowercase(),
            follow_external_links: config.follow_external_links,
            skip_extensions: normalize_extensions(&config.skip_extensions),
            html_extensions: normalize_extensions(&config.html_extensions),
            path_restriction: encode_path(config.effective_path_restriction()),
            regex,
            regex_is_inclusive: config.regex_is_inclusive,
            include,
            exclude,
        })
    }

    /// Returns true if links should be extracted from a resource at `depth`
    pub fn should_extract_links(&self, depth: u32, is_html: bool) -> bool {
        if !is_html {
            return false;
        }

        match self.mode {
            CrawlMode::Full | CrawlMode::Path | CrawlMode::Regex => depth < self.max_depth,
            CrawlMode::Design => depth == 0,
            CrawlMode::Single => false,
        }
    }

    /// Returns true if `candidate` may enter the frontier
    pub fn is_admissible(&self, candidate: &Url) -> bool {
        self.admission(candidate).is_ok()
    }

    /// Checks every admission rule, returning the first one that fails
    pub fn admission(&self, candidate: &Url) -> Result<(), Rejection> {
        if !matches!(candidate.scheme(), "http" | "https") {
            return Err(Rejection::UnsupportedScheme);
        }

        if !self.follow_external_links && self.is_external(candidate) {
            return Err(Rejection::ExternalDomain);
        }

        if let Some(ext) = path_extension(candidate) {
            if self.skip_extensions.contains(&ext) {
                return Err(Rejection::SkippedExtension(ext));
            }
        }

        match self.mode {
            CrawlMode::Path if !candidate.path().starts_with(&self.path_restriction) => {
                return Err(Rejection::OutsidePath);
            }
            CrawlMode::Regex => {
                if let Some(regex) = &self.regex {
                    if regex.is_match(candidate.as_str()) != self.regex_is_inclusive {
                        return Err(Rejection::RegexFilter);
                    }
                }
            }
            _ => {}
        }

        let url = candidate.as_str();
        if self.exclude.iter().any(|p| p.is_match(url)) {
            return Err(Rejection::Excluded);
        }
        if !self.include.is_empty() && !self.include.iter().any(|p| p.is_match(url)) {
            return Err(Rejection::NotIncluded);
        }

        Ok(())
    }

    /// Returns true if `url` is not on the crawl's base domain
    pub fn is_external(&self, url: &Url) -> bool {
        extract_domain(url).as_deref() != Some(self.base_domain.as_str())
    }

    /// Decides whether a resource is HTML
    ///
    /// The Content-Type wins when present; otherwise the URL's extension is
    /// checked against the HTML extensions, and extension-less paths count
    /// as HTML.
    pub fn is_html(&self, url: &Url, mime_type: Option<&str>) -> bool {
        match mime_type {
            Some(mime) => is_html_mime(mime),
            None => match path_extension(url) {
                Some(ext) => self.html_extensions.contains(&ext),
                None => true,
            },
        }
    }

    /// Classifies a resource from its MIME type, falling back to its extension
    pub fn resource_type(&self, url: &Url, mime_type: Option<&str>) -> ResourceType {
        if let Some(kind) = mime_type.and_then(resource_type_from_mime) {
            return kind;
        }

        match path_extension(url) {
            Some(ext) if self.html_extensions.contains(&ext) => ResourceType::Html,
            Some(ext) => resource_type_from_extension(&ext),
            None if mime_type.is_none() => ResourceType::Html,
            None => ResourceType::Other,
        }
    }
}

/// Percent-encodes a path the way `Url::path` reports it
fn encode_path(path: &str) -> String {
    match Url::parse("http://path.invalid/") {
        Ok(mut url) => {
            url.set_path(path);
            url.path().to_string()
        }
        Err(_) => path.to_string(),
    }
}

fn normalize_extensions(extensions: &BTreeSet<String>) -> BTreeSet<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_html_mime(mime: &str) -> bool {
    let essence = mime_essence(mime);
    essence == "text/html" || essence == "application/xhtml+xml"
}

fn mime_essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_lowercase()
}

fn resource_type_from_mime(mime: &str) -> Option<ResourceType> {
    let essence = mime_essence(mime);
    let kind = match essence.as_str() {
        "text/html" | "application/xhtml+xml" => ResourceType::Html,
        "text/css" => ResourceType::Css,
        "application/javascript" | "text/javascript" | "application/ecmascript"
        | "application/x-javascript" => ResourceType::Javascript,
        "application/pdf"
        | "application/msword"
        | "application/rtf"
        | "application/vnd.ms-excel"
        | "application/vnd.ms-powerpoint" => ResourceType::Document,
        "application/font-woff" | "application/x-font-ttf" | "application/vnd.ms-fontobject" => {
            ResourceType::Font
        }
        other if other.starts_with("image/") => ResourceType::Image,
        other if other.starts_with("font/") => ResourceType::Font,
        other if other.starts_with("application/vnd.openxmlformats-officedocument") => {
            ResourceType::Document
        }
        _ => return None,
    };
    Some(kind)
}

fn resource_type_from_extension(ext: &str) -> ResourceType {
    match ext {
        "css" => ResourceType::Css,
        "js" | "mjs" => ResourceType::Javascript,
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "bmp" | "avif" => {
            ResourceType::Image
        }
        "woff" | "woff2" | "ttf" | "otf" | "eot" => ResourceType::Font,
        "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "rtf" | "odt" => {
            ResourceType::Document
        }
        _ => ResourceType::Other,
    }
}
