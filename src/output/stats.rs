//! Statistics derived from a run report
//!
//! This module condenses a [`RunReport`] into the counters shown at the end
//! of a run and in the markdown summary.

use crate::crawler::RunReport;
use crate::results::ContactKind;
use crate::state::JobState;
use std::collections::BTreeMap;

/// Run statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    pub outcome: String,

    /// Number of jobs in the run
    pub total_jobs: usize,

    /// Jobs by final state, keyed by state name
    pub jobs_by_state: BTreeMap<&'static str, usize>,

    pub units_dispatched: u64,
    pub units_succeeded: u64,
    pub units_failed: u64,

    /// URLs the frontier refused because they were already claimed
    pub units_skipped: u64,

    pub emails: usize,
    pub phones: usize,
    pub listings: usize,

    pub duration_seconds: i64,
}

impl RunStatistics {
    /// Builds statistics from a finished run
    pub fn from_report(report: &RunReport) -> Self {
        let totals = report.totals();

        let mut jobs_by_state = BTreeMap::new();
        for job in &report.jobs {
            *jobs_by_state.entry(job.state.to_db_string()).or_insert(0) += 1;
        }

        let emails = report
            .result
            .contacts()
            .filter(|c| c.kind == ContactKind::Email)
            .count();

        Self {
            outcome: report.outcome.to_string(),
            total_jobs: report.jobs.len(),
            jobs_by_state,
            units_dispatched: totals.dispatched,
            units_succeeded: totals.succeeded,
            units_failed: totals.failed,
            units_skipped: totals.skipped,
            emails,
            phones: report.result.contact_count() - emails,
            listings: report.result.listing_count(),
            duration_seconds: report.duration().num_seconds(),
        }
    }

    /// Unique contacts plus listings
    pub fn total_records(&self) -> usize {
        self.emails + self.phones + self.listings
    }

    pub fn jobs_in(&self, state: JobState) -> usize {
        self.jobs_by_state
            .get(state.to_db_string())
            .copied()
            .unwrap_or(0)
    }

    /// Returns the fetch success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let finished = self.units_succeeded + self.units_failed;
        if finished == 0 {
            return 0.0;
        }
        (self.units_succeeded as f64 / finished as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Outcome: {}", stats.outcome);
    println!("Duration: {}s", stats.duration_seconds);
    println!();

    println!("Jobs ({}):", stats.total_jobs);
    for (state, count) in &stats.jobs_by_state {
        println!("  {}: {}", state, count);
    }
    println!();

    println!("Units:");
    println!("  Dispatched: {}", stats.units_dispatched);
    println!("  Succeeded: {}", stats.units_succeeded);
    println!("  Failed: {}", stats.units_failed);
    println!("  Already claimed: {}", stats.units_skipped);
    println!();

    println!("Records ({}):", stats.total_records());
    println!("  Emails: {}", stats.emails);
    println!("  Phones: {}", stats.phones);
    println!("  Listings: {}", stats.listings);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} fetches)",
        stats.success_rate(),
        stats.units_succeeded,
        stats.units_succeeded + stats.units_failed
    );
}
