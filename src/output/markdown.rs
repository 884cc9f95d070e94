//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a run: its
//! outcome, unit and record counts, a per-job table, and the jobs that left
//! a checkpoint to resume from.

use crate::crawler::RunReport;
use crate::output::stats::RunStatistics;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a run
///
/// # Arguments
///
/// * `report` - The finished run
/// * `config_hash` - Hash of the configuration that produced it, if known
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn write_markdown_summary(
    report: &RunReport,
    config_hash: Option<&str>,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(report, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_summary(report: &RunReport, config_hash: Option<&str>) -> String {
    let stats = RunStatistics::from_report(report);
    let mut md = String::new();

    md.push_str("# Contact Harvest Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        stats.duration_seconds,
        stats.duration_seconds as f64 / 60.0
    ));
    md.push_str(&format!("- **Outcome**: {}\n", stats.outcome));
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Emails**: {}\n", stats.emails));
    md.push_str(&format!("- **Phones**: {}\n", stats.phones));
    md.push_str(&format!("- **Listings**: {}\n", stats.listings));
    md.push_str(&format!("- **Units Dispatched**: {}\n", stats.units_dispatched));
    md.push_str(&format!("- **Units Failed**: {}\n", stats.units_failed));
    md.push_str(&format!("- **Already Claimed**: {}\n", stats.units_skipped));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n\n", stats.success_rate()));

    md.push_str("## Jobs\n\n");
    md.push_str("| Keyword | Engine | State | Resumed From | Units | Failed | New Records |\n");
    md.push_str("|---------|--------|-------|--------------|-------|--------|-------------|\n");
    for job in &report.jobs {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&job.job.keyword),
            job.job.engine,
            job.state,
            job.stats.resumed_from,
            job.stats.dispatched,
            job.stats.failed,
            job.stats.new_records
        ));
    }
    md.push('\n');

    let resumable: Vec<_> = report.resumable_jobs().collect();
    if !resumable.is_empty() {
        md.push_str("## Resumable Jobs\n\n");
        md.push_str("These jobs kept their checkpoint and continue on the next run:\n\n");
        for job in resumable {
            md.push_str(&format!("- {} ({})\n", job.job, job.state));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
