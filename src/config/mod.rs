//! Configuration module for harvesting runs
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Configuration is consumed once at run start and never changes mid-run.
//!
//! # Example
//!
//! ```no_run
//! use contact_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Pool size: {}", config.harvest.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CheckpointBackend, Config, CrawlConfig, ExtractorVariant, HarvestConfig, HarvestMode,
    OutputConfig, SearchConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, read_lines};
