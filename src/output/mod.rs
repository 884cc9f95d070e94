//! Output module for run reports and summaries
//!
//! This module handles:
//! - Writing the CSV report of harvested contacts and listings
//! - Generating a markdown summary of a run
//! - Computing and printing run statistics

mod csv_report;
mod markdown;
pub mod stats;

pub use csv_report::{write_csv_report, write_report, REPORT_HEADER};
pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{print_statistics, RunStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
