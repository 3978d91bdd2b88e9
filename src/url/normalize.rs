use crate::UrlError;
use url::Url;

/// Normalizes a URL to the form used for fetching and dedup
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host
/// 4. Remove fragment and query (dedup is path-level)
/// 5. Normalize path (see [`normalize_path`])
///
/// The host is case-folded by the URL parser itself; the scheme is kept as
/// given so the page is fetched the way it was linked.
///
/// # Examples
///
/// ```
/// use trust_crawler::url::normalize_url;
///
/// let url = normalize_url("http://Example.org/a//b/../c/?q=1#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.org/a/c");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Applies the same normalization to an already-parsed URL
pub fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    url.set_query(None);

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    Ok(url)
}

/// Normalizes a URL path into the per-domain dedup key
///
/// - Empty path becomes `/`
/// - Empty segments (from repeated slashes) and `.` are dropped
/// - `..` pops the previous segment
/// - Trailing slash is removed, except for root
///
/// ```
/// use trust_crawler::url::normalize_path;
///
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("/about/"), "/about");
/// assert_eq!(normalize_path("/a/./b/../c"), "/a/c");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}
