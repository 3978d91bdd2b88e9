use url::Url;

/// Derives the domain key used to scope dedup, budget and aggregation
///
/// The key is the lowercase host with any leading `www.` removed, plus `:port`
/// when the URL names a non-default port. The scheme never contributes, so
/// `http://Example.org/` and `https://www.example.org/x` share the key
/// `example.org`.
///
/// # Returns
///
/// * `Some(String)` - The domain key
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trust_crawler::url::domain_key;
///
/// let url = Url::parse("https://WWW.Example.COM/path").unwrap();
/// assert_eq!(domain_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(domain_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn domain_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let host = match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    };

    // url::Url reports None for the scheme's default port
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
