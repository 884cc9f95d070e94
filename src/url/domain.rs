use url::Url;

/// Extracts the host from a URL, lowercased and without a leading `www.`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use contact_harvester::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| {
        let host = h.to_lowercase();
        match host.strip_prefix("www.") {
            Some(stripped) => stripped.to_string(),
            None => host,
        }
    })
}

/// Returns true if both URLs live on the same host
///
/// This is the scope restriction for crawl-mode discovery. Ports are ignored
/// and `www.` is treated as the bare host.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
