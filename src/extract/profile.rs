//! Profile-oriented extraction
//!
//! Contacts are labelled with a best-effort person name, and search result
//! pages contribute candidate profile links as [`Listing`] rows.

use crate::crawler::parser::{collapse_whitespace, extract_links, extract_title, first_text};
use crate::extract::{collect_contacts, resolve_candidate, Extraction, Extractor, Page};
use crate::results::{Listing, ListingKind};
use crate::url::CandidateFilter;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Words that mark a block of text as naming a person or role
const NAME_KEYWORDS: &[&str] = &[
    "mr", "mrs", "dr", "engineer", "manager", "director", "owner", "ceo",
];

/// Blocks inspected around a contact when inferring a name
const NAME_BLOCKS: &str = "h1, h2, h3, p, span, div";

/// Blocks per ancestor considered before moving further out
const BLOCKS_PER_ANCESTOR: usize = 5;

/// Longer blocks are page sections rather than a name line
const MAX_LABEL_CHARS: usize = 120;

#[derive(Debug, Clone, Default)]
pub struct ProfileExtractor {
    candidate_filter: Option<CandidateFilter>,
}

impl ProfileExtractor {
    pub fn new(candidate_filter: Option<CandidateFilter>) -> Self {
        Self { candidate_filter }
    }

    fn candidate_listings(&self, document: &Html, base: &Url, source_url: &str) -> Vec<Listing> {
        let Some(filter) = &self.candidate_filter else {
            return Vec::new();
        };
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut listings = Vec::new();

        for anchor in document.select(&selector) {
            let Some(target) = anchor
                .value()
                .attr("href")
                .and_then(|href| resolve_candidate(href, base))
            else {
                continue;
            };

            if !filter.matches(&target) || !seen.insert(target.to_string()) {
                continue;
            }

            listings.push(Listing {
                kind: ListingKind::Profile,
                label: collapse_whitespace(anchor.text()),
                url: Some(target.to_string()),
                phone: None,
                address: None,
                source_url: source_url.to_string(),
            });
        }

        listings
    }
}

impl Extractor for ProfileExtractor {
    fn extract(&self, page: &Page<'_>) -> Extraction {
        let Ok(base) = Url::parse(page.url) else {
            return Extraction::default();
        };
        let document = Html::parse_document(page.body);

        let fallback = page_heading(&document).unwrap_or_default();
        let contacts = collect_contacts(&document, page.url, |_, value| {
            infer_name(&document, value).unwrap_or_else(|| fallback.clone())
        });

        let listings = self.candidate_listings(&document, &base, page.url);
        let candidates = listings.iter().filter_map(|l| l.url.clone()).collect();

        Extraction {
            contacts,
            links: extract_links(&document, &base),
            candidates,
            listings,
        }
    }

    fn name(&self) -> &'static str {
        "profile"
    }
}

/// Finds the name-like block nearest to the first text occurrence of `value`
///
/// Walks outwards from the text node through its ancestors; at each level the
/// first few heading/paragraph/span/div blocks are checked for a name keyword.
pub fn infer_name(document: &Html, value: &str) -> Option<String> {
    let blocks = Selector::parse(NAME_BLOCKS).ok()?;
    let needle = value.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let node = document.root_element().descendants().find(|node| {
        node.value()
            .as_text()
            .map(|text| text.to_lowercase().contains(&needle))
            .unwrap_or(false)
    })?;

    for ancestor in node.ancestors() {
        let Some(element) = ElementRef::wrap(ancestor) else {
            continue;
        };

        for block in element.select(&blocks).take(BLOCKS_PER_ANCESTOR) {
            let text = collapse_whitespace(block.text());
            if text.chars().count() <= MAX_LABEL_CHARS && has_name_keyword(&text) {
                return Some(text);
            }
        }
    }

    None
}

/// Page-level fallback label: the title, then the first h1, then the first h2
///
/// Titles like `Jane Doe | LinkedIn` keep only the part before the bar.
pub fn page_heading(document: &Html) -> Option<String> {
    extract_title(document)
        .map(|title| title.split('|').next().unwrap_or_default().trim().to_string())
        .filter(|title| !title.is_empty())
        .or_else(|| first_text(document, "h1"))
        .or_else(|| first_text(document, "h2"))
}

fn has_name_keyword(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .any(|word| NAME_KEYWORDS.contains(&word.as_str()))
}
