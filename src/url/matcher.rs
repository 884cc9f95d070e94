use url::Url;

/// Checks if a host matches a wildcard pattern
///
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches "example.com" and any subdomain
///
/// # Examples
///
/// ```
/// use contact_harvester::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "blog.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Domain predicate for candidate profile or listing links
///
/// Parsed from strings such as `"*.linkedin.com/in"`: a host pattern followed
/// by an optional path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFilter {
    host_pattern: String,
    path_prefix: Option<String>,
}

impl CandidateFilter {
    /// Parses a filter; returns None for an empty host pattern
    pub fn parse(filter: &str) -> Option<Self> {
        let filter = filter.trim().to_lowercase();
        let (host, path) = match filter.find('/') {
            Some(idx) => (&filter[..idx], Some(&filter[idx..])),
            None => (filter.as_str(), None),
        };

        if host.is_empty() {
            return None;
        }

        Some(Self {
            host_pattern: host.to_string(),
            path_prefix: path
                .map(|p| p.trim_end_matches('/').to_string())
                .filter(|p| !p.is_empty()),
        })
    }

    /// Returns true if the URL's host and path pass the filter
    pub fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str().map(|h| h.to_lowercase()) else {
            return false;
        };

        if !matches_wildcard(&self.host_pattern, &host) {
            return false;
        }

        match &self.path_prefix {
            Some(prefix) => {
                let path = url.path().to_lowercase();
                path == *prefix || path.starts_with(&format!("{}/", prefix))
            }
            None => true,
        }
    }
}
