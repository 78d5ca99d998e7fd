//! URL handling module for the website checker
//!
//! This module provides URL normalization, domain and origin extraction, and
//! the small path helpers the crawl policy relies on.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_external, origin_of, path_extension};
pub use normalize::normalize_url;
