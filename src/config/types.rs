use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Extensions of binary and media files that are never admitted to the frontier
pub const DEFAULT_SKIP_EXTENSIONS: &[&str] = &[
    "7z", "avi", "dmg", "doc", "docx", "exe", "flv", "gz", "iso", "mkv", "mov", "mp3", "mp4",
    "ogg", "pdf", "ppt", "pptx", "rar", "tar", "wav", "webm", "wmv", "xls", "xlsx", "zip",
];

/// Extensions that identify a page as HTML when the server sends no Content-Type
pub const DEFAULT_HTML_EXTENSIONS: &[&str] = &[
    "asp", "aspx", "htm", "html", "jsp", "php", "shtml", "xhtml",
];

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl strategy
///
/// The mode decides which pages are used as link sources and which
/// discovered links are admitted to the frontier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Recursive crawl bounded by depth and URL budget
    #[default]
    Full,
    /// Only the start page and the resources it references
    Design,
    /// The start page alone
    Single,
    /// Recursive crawl restricted to a path prefix
    Path,
    /// Recursive crawl filtered by a regular expression
    Regex,
}

impl CrawlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Design => "design",
            Self::Single => "single",
            Self::Path => "path",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrawlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "design" => Ok(Self::Design),
            "single" => Ok(Self::Single),
            "path" => Ok(Self::Path),
            "regex" => Ok(Self::Regex),
            other => Err(format!("unknown crawl mode '{}'", other)),
        }
    }
}

/// Settings consumed by one crawl
///
/// Immutable for the lifetime of the crawl. The engine keeps it and hands
/// workers the compiled `ModePolicy` built from it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Total URL budget (visited + queued)
    pub max_urls: usize,

    /// Maximum link depth from the start URL
    pub max_depth: u32,

    pub follow_external_links: bool,

    pub respect_robots_txt: bool,

    pub mode: CrawlMode,

    /// Path prefix for `path` mode (defaults to `/`)
    pub path_restriction: Option<String>,

    /// Pattern for `regex` mode
    pub regex_pattern: Option<String>,

    /// Whether regex matches are kept (`true`) or dropped (`false`)
    pub regex_is_inclusive: bool,

    /// Extensions (without the dot) that are never admitted
    pub skip_extensions: BTreeSet<String>,

    /// Extensions (without the dot) treated as HTML when no Content-Type is sent
    pub html_extensions: BTreeSet<String>,

    pub user_agent: String,

    /// Number of concurrent workers, clamped to 1..=16
    pub worker_count: usize,

    /// Per-page fetch timeout in seconds
    pub timeout: u64,

    pub verify_tls: bool,

    pub follow_redirects: bool,

    pub max_redirects: usize,

    /// Extra headers sent with every page request
    pub custom_headers: BTreeMap<String, String>,

    /// Links must match at least one of these patterns (when non-empty)
    pub include_patterns: Vec<String>,

    /// Links matching any of these patterns are dropped
    pub exclude_patterns: Vec<String>,
}

impl CrawlConfig {
    pub const MIN_WORKERS: usize = 1;
    pub const MAX_WORKERS: usize = 16;

    /// Worker count clamped to the supported range
    pub fn effective_worker_count(&self) -> usize {
        self.worker_count.clamp(Self::MIN_WORKERS, Self::MAX_WORKERS)
    }

    /// Path prefix used by `path` mode
    pub fn effective_path_restriction(&self) -> &str {
        match self.path_restriction.as_deref() {
            Some(path) if !path.trim().is_empty() => path.trim(),
            _ => "/",
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_urls: 100,
            max_depth: 3,
            follow_external_links: false,
            respect_robots_txt: true,
            mode: CrawlMode::Full,
            path_restriction: None,
            regex_pattern: None,
            regex_is_inclusive: true,
            skip_extensions: DEFAULT_SKIP_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            html_extensions: DEFAULT_HTML_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            user_agent: "WebsiteChecker/1.0".to_string(),
            worker_count: 4,
            timeout: 30,
            verify_tls: true,
            follow_redirects: true,
            max_redirects: 10,
            custom_headers: BTreeMap::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Where the command-line tool writes its results
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// SQLite database receiving one row per resource
    pub database_path: Option<String>,

    /// Markdown crawl summary
    pub summary_path: Option<String>,
}
