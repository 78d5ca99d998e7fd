use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use website_checker::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the origin (`scheme://host[:port]`) of a URL
///
/// robots.txt is scoped to an origin, so this is the robots cache key.
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Returns true if the URL lives on a different domain than `base_domain`
pub fn is_external(url: &Url, base_domain: &str) -> bool {
    match extract_domain(url) {
        Some(domain) => domain != base_domain,
        None => true,
    }
}

/// Returns the lowercase extension of the last path segment, if any
///
/// # Examples
///
/// ```
/// use url::Url;
/// use website_checker::url::path_extension;
///
/// let url = Url::parse("https://example.com/files/Report.PDF?download=1").unwrap();
/// assert_eq!(path_extension(&url), Some("pdf".to_string()));
/// ```
pub fn path_extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.last()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
