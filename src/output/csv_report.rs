//! CSV report of harvested records
//!
//! One row per unique contact, then one row per unique listing, both in key
//! order so two runs with the same results produce the same file.

use crate::output::OutputResult;
use crate::results::{Listing, RunResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Report header
pub const REPORT_HEADER: [&str; 5] = ["source_url", "kind", "value", "label", "detail"];

/// Writes the report for a run result to a file
///
/// # Arguments
///
/// * `result` - The deduplicated records of a run
/// * `output_path` - Destination; replaced if it exists
///
/// # Returns
///
/// * `Ok(usize)` - Number of data rows written
/// * `Err(OutputError)` - The file could not be created or written
pub fn write_csv_report(result: &RunResult, output_path: &Path) -> OutputResult<usize> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    let rows = write_report(result, file)?;
    tracing::info!("Wrote {} rows to {}", rows, output_path.display());
    Ok(rows)
}

/// Writes the report to any writer
pub fn write_report<W: Write>(result: &RunResult, writer: W) -> OutputResult<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(REPORT_HEADER)?;

    let mut rows = 0;

    for contact in result.contacts() {
        writer.write_record([
            contact.source_url.as_str(),
            contact.kind.as_str(),
            contact.value.as_str(),
            contact.label.as_str(),
            "",
        ])?;
        rows += 1;
    }

    for listing in result.listings() {
        writer.write_record([
            listing.source_url.as_str(),
            listing.kind.as_str(),
            listing_value(listing),
            listing.label.as_str(),
            listing_detail(listing).as_str(),
        ])?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

/// The URL of a listing, or its phone when it has no URL
fn listing_value(listing: &Listing) -> &str {
    listing
        .url
        .as_deref()
        .or(listing.phone.as_deref())
        .unwrap_or_default()
}

/// Phone and address, whichever are present
fn listing_detail(listing: &Listing) -> String {
    let phone = listing.url.as_ref().and(listing.phone.as_deref());
    [phone, listing.address.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("; ")
}
