use crate::config::types::{Config, CrawlConfig, CrawlMode, OutputConfig};
use crate::ConfigError;
use regex::Regex;
use reqwest::header::{HeaderName, HeaderValue};

/// Upper bound for the per-page timeout, in seconds
const MAX_TIMEOUT_SECS: u64 = 600;

/// Upper bound for redirect hops
const MAX_REDIRECTS: usize = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the settings consumed by the crawl engine
///
/// Runs before any worker is launched; every error here is fatal to the crawl.
pub fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_urls < 1 {
        return Err(ConfigError::Validation(format!(
            "max-urls must be >= 1, got {}",
            config.max_urls
        )));
    }

    if config.timeout < 1 || config.timeout > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout must be between 1 and {} seconds, got {}",
            MAX_TIMEOUT_SECS, config.timeout
        )));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= {}, got {}",
            MAX_REDIRECTS, config.max_redirects
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    validate_extensions("skip-extensions", config.skip_extensions.iter())?;
    validate_extensions("html-extensions", config.html_extensions.iter())?;

    if let Some(path) = &config.path_restriction {
        let path = path.trim();
        if !path.is_empty() && !path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "path-restriction must start with '/', got '{}'",
                path
            )));
        }
    }

    if config.mode == CrawlMode::Regex {
        if let Some(pattern) = &config.regex_pattern {
            compile_pattern(pattern)?;
        }
    }

    for pattern in config
        .include_patterns
        .iter()
        .chain(config.exclude_patterns.iter())
    {
        compile_pattern(pattern)?;
    }

    for (name, value) in &config.custom_headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ConfigError::Validation(format!("Invalid header name '{}': {}", name, e))
        })?;
        HeaderValue::from_str(value).map_err(|e| {
            ConfigError::Validation(format!("Invalid value for header '{}': {}", name, e))
        })?;
    }

    Ok(())
}

/// Compiles a user-supplied pattern, mapping failures to `InvalidPattern`
pub fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if matches!(&config.database_path, Some(path) if path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(path) if path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_extensions<'a>(
    field: &str,
    extensions: impl Iterator<Item = &'a String>,
) -> Result<(), ConfigError> {
    for ext in extensions {
        let trimmed = ext.trim_start_matches('.');
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "{} contains an invalid extension '{}'",
                field, ext
            )));
        }
    }
    Ok(())
}
