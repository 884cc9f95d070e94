//! Text patterns for contact identifiers
//!
//! Best-effort only: a match is a candidate, not a validated address.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("hardcoded regex pattern is valid")
});

static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d[\d\s\-]{7,}\d").expect("hardcoded regex pattern is valid")
});

/// File extensions that show up in `name@2x.png`-style asset names
const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Finds email-like strings in text, in order of appearance
pub fn find_emails(text: &str) -> Vec<String> {
    EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|email| !is_image_name(email))
        .collect()
}

/// Finds phone-like strings in text, in order of appearance
pub fn find_phones(text: &str) -> Vec<String> {
    PHONE_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|phone| {
            let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
            (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
        })
        .collect()
}

fn is_image_name(email: &str) -> bool {
    let lower = email.to_lowercase();
    IMAGE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Contact values taken from `mailto:` and `tel:` anchors
#[derive(Debug, Default)]
pub struct AnchorContacts {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

/// Collects `mailto:` and `tel:` anchor targets
///
/// Query strings (`mailto:a@b.com?subject=hi`) are dropped.
pub fn anchor_contacts(document: &Html) -> AnchorContacts {
    let mut found = AnchorContacts::default();

    let Ok(selector) = Selector::parse("a[href]") else {
        return found;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();

        if let Some(rest) = strip_prefix_ignore_case(href, "mailto:") {
            let address = rest.split('?').next().unwrap_or_default().trim();
            if !address.is_empty() {
                found.emails.push(address.to_string());
            }
        } else if let Some(rest) = strip_prefix_ignore_case(href, "tel:") {
            let number = rest.trim();
            if !number.is_empty() {
                found.phones.push(number.to_string());
            }
        }
    }

    found
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Non-blank text nodes of a document, in document order
///
/// Patterns run per node so that adjacent elements never fuse into one long
/// phone match.
pub fn text_nodes(document: &Html) -> impl Iterator<Item = &str> {
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
