//! HTML link location
//!
//! This module handles parsing fetched HTML to find:
//! - Outbound links (from `<a>` tags and canonical links)
//! - The "next page" link of a paginated listing
//! - Same-site links for crawl-mode discovery

use crate::url::same_host;
use scraper::{Html, Selector};
use url::Url;

/// Anchor-text keywords that mark a pagination link
///
/// Matched as lower-case substrings of the anchor text.
pub const NEXT_PAGE_KEYWORDS: &[&str] = &["next", ">", "older", "more", "suivant"];

/// Extracts the page title from the HTML document
pub fn extract_title(document: &Html) -> Option<String> {
    first_text(document, "title")
}

/// Text of the first element matching `selector`, whitespace-collapsed
pub fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| collapse_whitespace(element.text()))
        .filter(|s| !s.is_empty())
}

/// Joins text fragments with single spaces
pub fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts all valid links from the HTML document, in document order
///
/// **Include:** `<a href="...">` anywhere in the document and
/// `<link rel="canonical" href="...">`.
///
/// **Exclude:** `<a ... download>`, `javascript:`, `mailto:` and `tel:` links,
/// data URIs, and fragment-only links.
///
/// Malformed markup never fails: html5ever recovers what it can and the rest
/// yields no links.
///
/// # Example
///
/// ```
/// use contact_harvester::crawler::parser::extract_links;
/// use scraper::Html;
/// use url::Url;
///
/// let document = Html::parse_document(r#"<a href="/page">Link</a>"#);
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(
///     extract_links(&document, &base_url),
///     vec!["https://example.com/page".to_string()]
/// );
/// ```
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Finds the "next page" link of a paginated page
///
/// Scans anchors in document order and returns the first whose text contains
/// one of [`NEXT_PAGE_KEYWORDS`], resolved against `current_url`.
///
/// # Returns
///
/// * `Some(Url)` - The next page, which may equal `current_url`; callers
///   apply the cycle guard
/// * `None` - No pagination link on the page
pub fn find_next_page(html: &str, current_url: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    find_next_page_in(&document, current_url)
}

/// Same as [`find_next_page`] on an already parsed document
pub fn find_next_page_in(document: &Html, current_url: &Url) -> Option<Url> {
    let selector = Selector::parse("a[href]").ok()?;

    document.select(&selector).find_map(|anchor| {
        let text = collapse_whitespace(anchor.text()).to_lowercase();
        if !NEXT_PAGE_KEYWORDS.iter().any(|k| text.contains(k)) {
            return None;
        }

        anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, current_url))
            .and_then(|resolved| Url::parse(&resolved).ok())
    })
}

/// Keeps only links on the same host as `origin`
///
/// Cross-site links are dropped to bound crawl scope. Order is preserved.
pub fn same_site_links(links: &[String], origin: &Url) -> Vec<String> {
    links
        .iter()
        .filter(|link| {
            Url::parse(link)
                .map(|url| same_host(&url, origin))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        extract_links(&Html::parse_document(html), &base_url())
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test
            Page  </title></head><body></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_title(&document), Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        assert_eq!(extract_title(&Html::parse_document(html)), None);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        assert_eq!(links(html), vec!["https://example.com/other".to_string()]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r##"<html><body>
            <a href="javascript:void(0)">js</a>
            <a href="mailto:test@example.com">mail</a>
            <a href="tel:+1234567890">call</a>
            <a href="data:text/html,<h1>x</h1>">data</a>
            <a href="#section">jump</a>
            <a href="/file.pdf" download>file</a>
            <a href="/valid">ok</a>
        </body></html>"##;
        assert_eq!(links(html), vec!["https://example.com/valid".to_string()]);
    }

    #[test]
    fn test_extract_canonical_link() {
        let html = r#"<html><head><link rel="canonical" href="https://example.com/canonical" /></head><body></body></html>"#;
        assert!(links(html).contains(&"https://example.com/canonical".to_string()));
    }

    #[test]
    fn test_malformed_markup_degrades() {
        let html = "<html><body><a href=\"/ok\">unterminated <div><<<>";
        assert_eq!(links(html), vec!["https://example.com/ok".to_string()]);
    }

    #[test]
    fn test_find_next_page_first_match_wins() {
        let html = r#"<html><body>
            <a href="/about">About</a>
            <a href="/list?page=2">Next &raquo;</a>
            <a href="/list?page=9">Older posts</a>
        </body></html>"#;
        let next = find_next_page(html, &Url::parse("https://example.com/list").unwrap());
        assert_eq!(next.unwrap().as_str(), "https://example.com/list?page=2");
    }

    #[test]
    fn test_find_next_page_non_english() {
        let html = r#"<a href="p2.html">Page suivante</a>"#;
        let next = find_next_page(html, &Url::parse("https://example.fr/annuaire/p1.html").unwrap());
        assert_eq!(next.unwrap().as_str(), "https://example.fr/annuaire/p2.html");
    }

    #[test]
    fn test_find_next_page_none() {
        let html = r#"<a href="/home">Home</a><a href="/contact">Contact</a>"#;
        assert!(find_next_page(html, &base_url()).is_none());
    }

    #[test]
    fn test_find_next_page_may_return_self() {
        let html = r#"<a href="/page">Next</a>"#;
        let current = base_url();
        assert_eq!(find_next_page(html, &current), Some(current));
    }

    #[test]
    fn test_same_site_links() {
        let origin = Url::parse("https://acme.com/").unwrap();
        let links = vec![
            "https://acme.com/team".to_string(),
            "https://www.acme.com/contact".to_string(),
            "https://other.com/".to_string(),
            "https://blog.acme.com/".to_string(),
        ];
        assert_eq!(
            same_site_links(&links, &origin),
            vec![
                "https://acme.com/team".to_string(),
                "https://www.acme.com/contact".to_string()
            ]
        );
    }
}
