//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `JobState`: Lifecycle of a single (keyword, engine) job
//! - `JobKey`: The identity a job is checkpointed under

mod job_key;
mod job_state;

pub use job_key::JobKey;
pub use job_state::JobState;
