/// Job state definitions for tracking harvest progress
///
/// A job moves `Pending -> Running` once and then ends in exactly one terminal
/// state. Jobs that never start stay `Pending`.
use crate::HarvestError;
use std::fmt;

/// Represents the lifecycle state of one (keyword, engine) job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// Job has not been started yet
    Pending,

    /// Job's units are being dispatched to the worker pool
    Running,

    // ===== Terminal States =====
    /// Every unit of the job completed; its cursor marks the end of its sequence
    Completed,

    /// The run's record ceiling was reached; the cursor was kept
    QuotaStopped,

    /// An interrupt was signalled or a unit never finished; the cursor was kept
    Interrupted,
}

impl JobState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::QuotaStopped | Self::Interrupted)
    }

    /// Returns true if the job stopped early and left a checkpoint to resume from
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::QuotaStopped | Self::Interrupted)
    }

    /// Returns true if moving from this state to `to` is allowed
    pub fn can_transition_to(&self, to: JobState) -> bool {
        match self {
            Self::Pending => to == Self::Running,
            Self::Running => to.is_terminal(),
            _ => false,
        }
    }

    /// Moves to `to`, rejecting transitions the state machine does not allow
    pub fn transition(self, to: JobState) -> Result<JobState, HarvestError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(HarvestError::InvalidTransition { from: self, to })
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::QuotaStopped => "quota_stopped",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
