//! Per-job and per-run outcomes returned by the coordinator

use crate::crawler::source::Job;
use crate::results::RunResult;
use crate::state::JobState;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::ops::AddAssign;
use thiserror::Error;

/// Unit counters for one job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Cursor the job resumed from
    pub resumed_from: u64,
    /// Units handed to the worker pool
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// URLs refused by the frontier because they were already claimed
    pub skipped: u64,
    /// Contacts and listings this job added to the run result
    pub new_records: u64,
}

impl AddAssign for JobStats {
    fn add_assign(&mut self, other: Self) {
        self.dispatched += other.dispatched;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.new_records += other.new_records;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job: Job,
    pub state: JobState,
    pub stats: JobStats,
}

impl JobReport {
    /// Report for a job that never started
    pub fn pending(job: Job) -> Self {
        Self {
            job,
            state: JobState::Pending,
            stats: JobStats::default(),
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every job completed; the checkpoint was deleted
    Completed,
    /// The record ceiling stopped the run; the checkpoint was kept
    QuotaStopped,
    /// Cancellation stopped the run; the checkpoint was kept
    Interrupted,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::QuotaStopped => "quota reached",
            Self::Interrupted => "interrupted",
        }
    }

    /// Derives the run outcome from its job reports
    ///
    /// A run whose jobs all completed is `Completed` even if cancellation
    /// arrived after the last one. Otherwise an interrupt wins over a quota
    /// stop.
    pub fn from_jobs(jobs: &[JobReport], interrupted: bool) -> Self {
        if jobs.iter().all(|r| r.state == JobState::Completed) {
            Self::Completed
        } else if interrupted || jobs.iter().any(|r| r.state == JobState::Interrupted) {
            Self::Interrupted
        } else {
            Self::QuotaStopped
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub jobs: Vec<JobReport>,
    pub result: RunResult,
    pub outcome: RunOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Counters summed over every job
    pub fn totals(&self) -> JobStats {
        let mut totals = JobStats::default();
        for report in &self.jobs {
            totals += report.stats;
        }
        totals
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Jobs that left a checkpoint behind
    pub fn resumable_jobs(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|r| r.state.is_resumable())
    }
}

/// A run that stopped on a fatal error
///
/// Records merged before the failure are kept so they can still be reported.
#[derive(Debug, Error)]
#[error("Run aborted: {error}")]
pub struct RunAborted {
    #[source]
    pub error: HarvestError,
    pub result: RunResult,
}
