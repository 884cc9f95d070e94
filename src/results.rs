//! Harvested records and the run-wide deduplicated result set
//!
//! Workers complete out of order, so everything here is written to make the
//! final set a pure function of *which* records arrived, never of the order in
//! which they arrived.

use crate::url::frontier_key;
use std::collections::BTreeMap;
use std::fmt;

/// Characters stripped from the end of phone-like values
const PHONE_TRAILING_SEPARATORS: &[char] = &['-', '.', ',', ';', '/', ':', '(', ')'];

/// The kind of a contact identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactKind {
    Email,
    Phone,
}

impl ContactKind {
    /// Label used in the report's `kind` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
        }
    }

    /// Normalizes a raw value into its dedup form
    ///
    /// Emails are trimmed and lower-cased. Phones are trimmed and lose any
    /// trailing separator characters.
    pub fn normalize(&self, raw: &str) -> String {
        match self {
            Self::Email => raw.trim().to_lowercase(),
            Self::Phone => raw
                .trim()
                .trim_end_matches(|c: char| c.is_whitespace() || PHONE_TRAILING_SEPARATORS.contains(&c))
                .to_string(),
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single harvested contact identifier
///
/// Immutable once created. Two records with the same [`ContactRecord::key`]
/// are the same contact, whatever page they came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContactRecord {
    pub kind: ContactKind,
    pub value: String,
    pub source_url: String,
    pub label: String,
}

/// Identity of a contact: kind plus normalized value
pub type ContactKey = (ContactKind, String);

impl ContactRecord {
    pub fn new(
        kind: ContactKind,
        value: impl Into<String>,
        source_url: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        let value = value.into();
        Self {
            kind,
            value: kind.normalize(&value),
            source_url: source_url.into(),
            label: label.into().trim().to_string(),
        }
    }

    pub fn email(value: &str, source_url: &str, label: &str) -> Self {
        Self::new(ContactKind::Email, value, source_url, label)
    }

    pub fn phone(value: &str, source_url: &str, label: &str) -> Self {
        Self::new(ContactKind::Phone, value, source_url, label)
    }

    pub fn key(&self) -> ContactKey {
        (self.kind, self.kind.normalize(&self.value))
    }
}

/// The kind of a listing row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListingKind {
    /// A candidate profile link found on a result page
    Profile,
    /// A business card from a directory listing
    Business,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "PROFILE",
            Self::Business => "BUSINESS",
        }
    }
}

/// A profile or business listing found on a page
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Listing {
    pub kind: ListingKind,
    pub label: String,
    pub url: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub source_url: String,
}

/// Identity of a listing
pub type ListingKey = (ListingKind, String);

impl Listing {
    /// Listings with a URL are identified by the normalized URL; the rest by
    /// lower-cased label plus normalized phone.
    pub fn key(&self) -> ListingKey {
        let identity = match &self.url {
            Some(url) => frontier_key(url),
            None => format!(
                "{}|{}",
                self.label.trim().to_lowercase(),
                self.phone
                    .as_deref()
                    .map(|p| ContactKind::Phone.normalize(p))
                    .unwrap_or_default()
            ),
        };
        (self.kind, identity)
    }
}

/// The deduplicated records of one run
///
/// When two records share a key, the one that sorts first is kept, which makes
/// the stored representative independent of arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    contacts: BTreeMap<ContactKey, ContactRecord>,
    listings: BTreeMap<ListingKey, Listing>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a batch of records, returning how many new identities it added
    ///
    /// # Arguments
    ///
    /// * `contacts` - Contact records from one completed unit
    /// * `listings` - Listing rows from the same unit
    ///
    /// # Returns
    ///
    /// The number of contacts and listings whose key was not present before.
    pub fn merge<C, L>(&mut self, contacts: C, listings: L) -> usize
    where
        C: IntoIterator<Item = ContactRecord>,
        L: IntoIterator<Item = Listing>,
    {
        let mut added = 0;

        for record in contacts {
            if record.value.is_empty() {
                continue;
            }
            if insert_smallest(&mut self.contacts, record.key(), record) {
                added += 1;
            }
        }

        for listing in listings {
            if insert_smallest(&mut self.listings, listing.key(), listing) {
                added += 1;
            }
        }

        added
    }

    /// Merges another result set into this one
    pub fn absorb(&mut self, other: RunResult) -> usize {
        self.merge(other.contacts.into_values(), other.listings.into_values())
    }

    /// Unique contacts plus unique listings; the quota measure
    pub fn count(&self) -> u64 {
        (self.contacts.len() + self.listings.len()) as u64
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    pub fn contains(&self, kind: ContactKind, value: &str) -> bool {
        self.contacts.contains_key(&(kind, kind.normalize(value)))
    }

    /// Contacts in key order
    pub fn contacts(&self) -> impl Iterator<Item = &ContactRecord> {
        self.contacts.values()
    }

    /// Listings in key order
    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty() && self.listings.is_empty()
    }
}

/// Inserts `value`, or replaces the existing entry if `value` sorts before it
///
/// Returns true only when the key was new.
fn insert_smallest<K: Ord, V: Ord>(map: &mut BTreeMap<K, V>, key: K, value: V) -> bool {
    match map.get_mut(&key) {
        Some(existing) => {
            if value < *existing {
                *existing = value;
            }
            false
        }
        None => {
            map.insert(key, value);
            true
        }
    }
}
