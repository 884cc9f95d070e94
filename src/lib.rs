//! Contact Harvester: a resumable concurrent contact harvesting engine
//!
//! This crate discovers pages through search-engine result URLs, seed lists,
//! and pagination chains, fetches them with a bounded worker pool, and pulls
//! emails, phone numbers, and profile/business listings out of the bodies.
//! Progress is checkpointed per (keyword, engine) so an interrupted run can
//! pick up exactly where it stopped.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod results;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for harvesting runs
///
/// Only conditions that make a run impossible or unsafe to continue end up
/// here. Per-page fetch and extraction problems are counted and logged by the
/// coordinator instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] storage::StorageError),

    #[error("Report error: {0}")]
    Report(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid job transition: {from} -> {to}")]
    InvalidTransition {
        from: state::JobState,
        to: state::JobState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config or input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error("Invalid candidate filter: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for harvesting operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, EngineId, Frontier, Job, PageFetcher, SourceGenerator};
pub use extract::Extractor;
pub use results::{ContactKind, ContactRecord, Listing, RunResult};
pub use state::JobState;
pub use storage::ProgressStore;
