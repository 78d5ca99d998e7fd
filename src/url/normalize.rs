use crate::UrlError;
use std::borrow::Cow;
use url::Url;

/// Schemes that never carry an authority and are rejected outright
const OPAQUE_SCHEMES: &[&str] = &["mailto", "javascript", "tel", "data", "about", "blob"];

/// Normalizes a URL into the canonical form used as the frontier key
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prefix `https://` when no scheme is present; reject non-HTTP(S) schemes
/// 3. Lowercase the host
/// 4. Normalize the path:
///    - Remove dot segments (`.` and `..`), never popping above the root
///    - Collapse repeated slashes
///    - Ensure a leading `/` (empty path becomes `/`)
///    - Keep a trailing slash if one was present
/// 5. Keep the query string verbatim
/// 6. Remove the fragment
///
/// The function is idempotent: normalizing an already normalized URL returns
/// it unchanged.
///
/// # Examples
///
/// ```
/// use website_checker::url::normalize_url;
///
/// let url = normalize_url("http://Example.com/a/./b/../c").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/a/c");
///
/// let url = normalize_url("example.com/docs//intro?lang=en#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/intro?lang=en");
/// ```
pub fn normalize_url(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let with_scheme: Cow<'_, str> = match explicit_scheme(trimmed) {
        Some(scheme)
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
        {
            Cow::Borrowed(trimmed)
        }
        Some(scheme) => {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                scheme
            )))
        }
        None => Cow::Owned(format!("https://{}", trimmed)),
    };

    let mut url =
        Url::parse(&with_scheme).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    let host = url.host_str().ok_or(UrlError::MissingDomain)?;
    if host.is_empty() {
        return Err(UrlError::MissingDomain);
    }
    let lowered = host.to_lowercase();
    if lowered != host {
        url.set_host(Some(&lowered))
            .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    // Fragments never change what the server returns
    url.set_fragment(None);

    Ok(url)
}

/// Returns the scheme of `raw` if it has one
///
/// `host:port/path` is not mistaken for a scheme: a candidate only counts
/// when followed by `//` or when it is a known authority-less scheme.
fn explicit_scheme(raw: &str) -> Option<&str> {
    let (candidate, rest) = raw.split_once(':')?;

    let mut chars = candidate.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid = starts_alpha && chars.all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c));
    if !valid {
        return None;
    }

    let opaque = OPAQUE_SCHEMES
        .iter()
        .any(|scheme| candidate.eq_ignore_ascii_case(scheme));

    if rest.starts_with("//") || opaque {
        Some(candidate)
    } else {
        None
    }
}

/// Removes dot segments and repeated slashes from a URL path
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let mut trailing_slash = path.ends_with('/');

    for segment in path.split('/') {
        match segment {
            "" => continue,
            "." => trailing_slash = true,
            ".." => {
                segments.pop();
                trailing_slash = true;
            }
            _ => {
                segments.push(segment);
                trailing_slash = false;
            }
        }
    }

    // A trailing empty segment means the original ended with '/'
    if path.ends_with('/') {
        trailing_slash = true;
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut result = format!("/{}", segments.join("/"));
    if trailing_slash {
        result.push('/');
    }
    result
}
