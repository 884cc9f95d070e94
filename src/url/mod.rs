//! URL handling module
//!
//! This module provides URL normalization (the Frontier's identity for a unit
//! of work), host extraction for same-site scoping, and wildcard host
//! patterns used to filter candidate profile links.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, same_host};
pub use matcher::{matches_wildcard, CandidateFilter};
pub use normalize::{frontier_key, normalize_url};
