//! Crawler module for page discovery, fetching, and orchestration
//!
//! This module contains the harvesting engine:
//! - Candidate URL generation per (keyword, engine)
//! - The run-scoped frontier that gates dispatch
//! - Single-shot HTTP fetching
//! - Link location for pagination and same-site discovery
//! - Job and run coordination with checkpointing

mod coordinator;
mod fetcher;
mod frontier;
pub mod parser;
mod report;
mod source;

pub use coordinator::Coordinator;
pub use fetcher::{random_user_agent, FetchFailure, FetchResult, PageFetcher, DEFAULT_FETCH_TIMEOUT};
pub use frontier::Frontier;
pub use parser::{find_next_page, same_site_links};
pub use report::{JobReport, JobStats, RunAborted, RunOutcome, RunReport};
pub use source::{default_query_template, plan_jobs, EngineId, Job, SourceGenerator};
