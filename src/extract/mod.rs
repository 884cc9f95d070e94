//! Extraction of contacts, links, and listings from fetched pages
//!
//! Extraction is a capability: the coordinator holds an `Arc<dyn Extractor>`
//! chosen once per run and never needs to know which variant it is.
//!
//! # Variants
//!
//! - `GenericExtractor`: emails and phones labelled with the job keyword
//! - `ProfileExtractor`: contacts labelled with an inferred person name, plus
//!   candidate profile links from search result pages
//! - `ListingExtractor`: business cards from directory result pages
//!
//! Every variant is total: malformed markup degrades to an empty
//! [`Extraction`], never to an error.

mod generic;
mod listing;
pub mod patterns;
mod profile;

pub use generic::GenericExtractor;
pub use listing::ListingExtractor;
pub use profile::ProfileExtractor;

use crate::config::ExtractorVariant;
use crate::results::{ContactKind, ContactRecord, Listing};
use crate::url::CandidateFilter;
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Filter applied to profile candidates when none is configured
pub const DEFAULT_PROFILE_FILTER: &str = "*.linkedin.com/in";

/// A fetched page handed to an extractor
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// Final URL of the page, after redirects
    pub url: &'a str,
    pub body: &'a str,
    /// Keyword of the job the page belongs to
    pub keyword: &'a str,
}

/// What an extractor found on one page
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub contacts: Vec<ContactRecord>,

    /// Every absolute http(s) outbound link, in document order
    pub links: Vec<String>,

    /// Profile or listing URLs that passed the candidate filter
    pub candidates: Vec<String>,

    pub listings: Vec<Listing>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
            && self.links.is_empty()
            && self.candidates.is_empty()
            && self.listings.is_empty()
    }
}

/// Turns a page body into records and links
pub trait Extractor: Send + Sync {
    fn extract(&self, page: &Page<'_>) -> Extraction;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Builds the extractor for a configured variant
///
/// # Arguments
///
/// * `variant` - Which extractor to build
/// * `candidate_filter` - Optional filter string such as `"*.linkedin.com/in"`
pub fn build_extractor(
    variant: ExtractorVariant,
    candidate_filter: Option<&str>,
) -> Arc<dyn Extractor> {
    let filter = candidate_filter.and_then(CandidateFilter::parse);

    match variant {
        ExtractorVariant::Generic => Arc::new(GenericExtractor::new(filter)),
        ExtractorVariant::Profile => Arc::new(ProfileExtractor::new(
            filter.or_else(|| CandidateFilter::parse(DEFAULT_PROFILE_FILTER)),
        )),
        ExtractorVariant::Listing => Arc::new(ListingExtractor::new()),
    }
}

/// Collects anchor and text contacts from a document
///
/// `label` is asked for a label once per distinct contact.
pub(crate) fn collect_contacts<F>(document: &Html, source_url: &str, mut label: F) -> Vec<ContactRecord>
where
    F: FnMut(ContactKind, &str) -> String,
{
    let anchors = patterns::anchor_contacts(document);

    let mut emails = anchors.emails;
    let mut phones = anchors.phones;
    for text in patterns::text_nodes(document) {
        emails.extend(patterns::find_emails(text));
        phones.extend(patterns::find_phones(text));
    }

    let mut seen = HashSet::new();
    let mut contacts = Vec::new();

    let candidates = emails
        .into_iter()
        .map(|v| (ContactKind::Email, v))
        .chain(phones.into_iter().map(|v| (ContactKind::Phone, v)));

    for (kind, raw) in candidates {
        let key = (kind, kind.normalize(&raw));
        if key.1.is_empty() || !seen.insert(key) {
            continue;
        }
        let record_label = label(kind, &raw);
        contacts.push(ContactRecord::new(kind, raw, source_url, record_label));
    }

    contacts
}

/// Resolves an href, unwrapping search-engine redirect links
///
/// `/url?q=https://target/...` (and the same under an absolute search host)
/// resolves to the target.
pub(crate) fn resolve_candidate(href: &str, base: &Url) -> Option<Url> {
    let joined = base.join(href.trim()).ok()?;

    let target = if joined.path() == "/url" {
        joined
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .and_then(|(_, v)| Url::parse(&v).ok())
            .unwrap_or(joined)
    } else {
        joined
    };

    matches!(target.scheme(), "http" | "https").then_some(target)
}
