//! Robots.txt parser implementation
//!
//! This module wraps the robotstxt crate's matcher behind a small rule-set type.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt rules for one origin
///
/// Either the raw robots.txt body (matched on demand) or an explicit
/// allow-all decision, used whenever robots.txt could not be fetched.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a rule set from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive rule set that allows everything
    ///
    /// This is used as the default when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if this rule set is the allow-all fallback
    pub fn is_allow_all(&self) -> bool {
        self.allow_all
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The full user agent string; only its product token
    ///   (e.g. `WebsiteChecker` in `WebsiteChecker/1.0`) is matched against
    ///   `User-agent` groups
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token(user_agent), url)
    }
}

/// Returns the product token of a user agent string
///
/// robots.txt groups name products, not full user agent strings.
pub fn product_token(user_agent: &str) -> &str {
    let trimmed = user_agent.trim();
    let end = trimmed
        .find(|c: char| c == '/' || c.is_whitespace())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const UA: &str = "TestBot/1.0";

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allow_all());
        assert!(robots.is_allowed("https://example.com/any/path", UA));
        assert!(robots.is_allowed("https://example.com/admin", UA));
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /");
        assert!(!robots.is_allow_all());
        assert!(!robots.is_allowed("https://example.com/", UA));
        assert!(!robots.is_allowed("https://example.com/page", UA));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /private");
        assert!(robots.is_allowed("https://example.com/", UA));
        assert!(robots.is_allowed("https://example.com/public", UA));
        assert!(!robots.is_allowed("https://example.com/private", UA));
        assert!(!robots.is_allowed("https://example.com/private/page", UA));
    }

    #[test]
    fn test_parse_allow_and_disallow() {
        let content = "User-agent: *\nDisallow: /private\nAllow: /private/public";
        let robots = ParsedRobots::from_content(content);
        assert!(!robots.is_allowed("https://example.com/private", UA));
        assert!(robots.is_allowed("https://example.com/private/public", UA));
    }

    #[test]
    fn test_group_matches_product_token() {
        let content = "User-agent: TestBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(!robots.is_allowed("https://example.com/page", "TestBot/1.0"));
        assert!(robots.is_allowed("https://example.com/page", "OtherBot/2.1"));
    }

    #[test]
    fn test_invalid_robots_txt() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(robots.is_allowed("https://example.com/any/path", UA));
    }

    #[test]
    fn test_empty_robots_txt() {
        let robots = ParsedRobots::from_content("");
        assert!(robots.is_allowed("https://example.com/any/path", UA));
    }

    #[test]
    fn test_product_token() {
        assert_eq!(product_token("WebsiteChecker/1.0"), "WebsiteChecker");
        assert_eq!(product_token("  Bot (+https://x.y)"), "Bot");
        assert_eq!(product_token("Plain"), "Plain");
    }
}
