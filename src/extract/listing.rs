use crate::crawler::parser::{collapse_whitespace, extract_links, resolve_link};
use crate::extract::patterns::find_emails;
use crate::extract::{Extraction, Extractor, Page};
use crate::results::{ContactKind, ContactRecord, Listing, ListingKind};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parses business cards out of directory result pages
///
/// Each `div.result` card becomes one business listing. A card's phone is also
/// reported as a contact labelled with the business name, and its website
/// becomes a candidate link.
#[derive(Debug, Clone, Default)]
pub struct ListingExtractor;

impl ListingExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// Selectors for one directory card
struct CardSelectors {
    card: Selector,
    name: Selector,
    phone: Selector,
    address: Selector,
    website: Selector,
}

impl CardSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            card: Selector::parse("div.result").ok()?,
            name: Selector::parse("h2.n").ok()?,
            phone: Selector::parse("div.phones").ok()?,
            address: Selector::parse("div.street-address").ok()?,
            website: Selector::parse("a.track-visit-website").ok()?,
        })
    }
}

fn card_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|element| collapse_whitespace(element.text()))
        .filter(|text| !text.is_empty())
}

impl Extractor for ListingExtractor {
    fn extract(&self, page: &Page<'_>) -> Extraction {
        let Ok(base) = Url::parse(page.url) else {
            return Extraction::default();
        };
        let document = Html::parse_document(page.body);

        let mut extraction = Extraction {
            links: extract_links(&document, &base),
            ..Extraction::default()
        };

        let Some(css) = CardSelectors::new() else {
            return extraction;
        };

        for card in document.select(&css.card) {
            let label = card_text(&card, &css.name).unwrap_or_else(|| "Unknown".to_string());
            let phone = card_text(&card, &css.phone);
            let address = card_text(&card, &css.address);
            let website = card
                .select(&css.website)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve_link(href, &base));

            if let Some(phone) = &phone {
                extraction
                    .contacts
                    .push(ContactRecord::new(ContactKind::Phone, phone.as_str(), page.url, label.as_str()));
            }

            for email in card.text().flat_map(find_emails) {
                extraction
                    .contacts
                    .push(ContactRecord::new(ContactKind::Email, email, page.url, label.as_str()));
            }

            if let Some(site) = &website {
                extraction.candidates.push(site.clone());
            }

            extraction.listings.push(Listing {
                kind: ListingKind::Business,
                label,
                url: website,
                phone,
                address,
                source_url: page.url.to_string(),
            });
        }

        extraction
    }

    fn name(&self) -> &'static str {
        "listing"
    }
}
