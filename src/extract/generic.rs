use crate::crawler::parser::extract_links;
use crate::extract::{collect_contacts, resolve_candidate, Extraction, Extractor, Page};
use crate::url::CandidateFilter;
use scraper::Html;
use url::Url;

/// Harvests every email and phone on a page, labelled with the job keyword
#[derive(Debug, Clone, Default)]
pub struct GenericExtractor {
    candidate_filter: Option<CandidateFilter>,
}

impl GenericExtractor {
    pub fn new(candidate_filter: Option<CandidateFilter>) -> Self {
        Self { candidate_filter }
    }
}

impl Extractor for GenericExtractor {
    fn extract(&self, page: &Page<'_>) -> Extraction {
        let Ok(base) = Url::parse(page.url) else {
            return Extraction::default();
        };
        let document = Html::parse_document(page.body);

        let contacts = collect_contacts(&document, page.url, |_, _| page.keyword.to_string());
        let links = extract_links(&document, &base);

        let candidates = match &self.candidate_filter {
            Some(filter) => links
                .iter()
                .filter_map(|link| resolve_candidate(link, &base))
                .filter(|url| filter.matches(url))
                .map(|url| url.to_string())
                .collect(),
            None => Vec::new(),
        };

        Extraction {
            contacts,
            links,
            candidates,
            listings: Vec::new(),
        }
    }

    fn name(&self) -> &'static str {
        "generic"
    }
}
