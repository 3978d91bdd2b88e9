//! HTML link extraction
//!
//! Only `<a href>` anchors are read. Each href is resolved against the page URL,
//! stripped of query and fragment, and kept only if its domain key is in the
//! crawl's current scope.

use crate::state::DomainScope;
use crate::url::{canonicalize, domain_key};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts the set of in-scope links from an HTML page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` resolving to an `http`/`https` URL whose domain key is in `scope`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Links to any host outside `scope`
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the page was served from, for resolving relative links
/// * `scope` - Domain keys the crawl accepts (seed plus redirect target)
///
/// # Example
///
/// ```
/// use trust_crawler::crawler::extract_links;
/// use trust_crawler::state::DomainScope;
/// use url::Url;
///
/// let html = r#"<a href="/a?x=1">A</a><a href="http://other.org/x">X</a>"#;
/// let base_url = Url::parse("http://example.org/").unwrap();
/// let links = extract_links(html, &base_url, &DomainScope::new(["example.org"]));
/// assert_eq!(links.len(), 1);
/// assert_eq!(links.iter().next().unwrap().as_str(), "http://example.org/a");
/// ```
pub fn extract_links(html: &str, base_url: &Url, scope: &DomainScope) -> BTreeSet<Url> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        else {
            continue;
        };

        if domain_key(&url).is_some_and(|key| scope.contains(&key)) {
            links.insert(url);
        }
    }

    links
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only and empty hrefs
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    canonicalize(absolute_url).ok()
}
