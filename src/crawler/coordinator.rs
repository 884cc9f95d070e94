//! Harvest coordinator - run and job orchestration
//!
//! Jobs of a run execute one after another. Inside a job, units of work (one
//! URL each: fetch, extract, merge, checkpoint) run on a bounded set of tasks
//! and are handled in completion order. Tasks only fetch and extract; the
//! coordinator loop is the single writer of the run result, the frontier
//! claims, and the persisted cursor.
//!
//! Cancellation is cooperative. The token is checked before each unit is
//! submitted and before each job starts; an in-flight fetch is never aborted,
//! so its checkpoint write always follows a finished unit.

use crate::config::{Config, HarvestConfig, HarvestMode};
use crate::crawler::fetcher::{FetchFailure, FetchResult, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{find_next_page, same_site_links};
use crate::crawler::report::{JobReport, JobStats, RunAborted, RunOutcome, RunReport};
use crate::crawler::source::{Job, SourceGenerator};
use crate::extract::{build_extractor, Extraction, Extractor, Page};
use crate::results::RunResult;
use crate::state::{JobKey, JobState};
use crate::storage::ProgressStore;
use crate::url::frontier_key;
use crate::HarvestError;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Completed units between progress log lines
const PROGRESS_INTERVAL: u64 = 10;

/// Main harvest coordinator
pub struct Coordinator {
    settings: HarvestConfig,
    fetcher: PageFetcher,
    extractor: Arc<dyn Extractor>,
    generator: SourceGenerator,
    store: Box<dyn ProgressStore>,
    cancel: CancellationToken,
}

/// State scoped to one run
///
/// Created fresh by every call to [`Coordinator::run`], so two runs never
/// share claims or results.
#[derive(Debug, Default)]
struct Run {
    frontier: Frontier,
    result: RunResult,
    reports: Vec<JobReport>,
}

/// Low watermark over the indexed units of one job
///
/// `next_index` is the smallest index whose unit has not completed. Indices
/// completing out of order wait in `completed` until the gap below them
/// closes, so the persisted value never passes unfinished work.
#[derive(Debug)]
struct JobCursor {
    key: JobKey,
    next_index: u64,
    completed: BTreeSet<u64>,
}

impl JobCursor {
    fn new(key: JobKey, start: u64) -> Self {
        Self {
            key,
            next_index: start,
            completed: BTreeSet::new(),
        }
    }

    /// Records a completed index; returns true if the watermark moved
    fn complete(&mut self, index: u64) -> bool {
        if index < self.next_index {
            return false;
        }
        self.completed.insert(index);

        let before = self.next_index;
        while self.completed.remove(&self.next_index) {
            self.next_index += 1;
        }
        self.next_index != before
    }
}

/// One URL to process; generated units carry their index
#[derive(Debug)]
struct Unit {
    index: Option<u64>,
    url: String,
}

#[derive(Debug)]
struct FetchedPage {
    final_url: String,
    extraction: Extraction,
    next_page: Option<String>,
}

#[derive(Debug)]
struct UnitOutcome {
    unit: Unit,
    page: Result<FetchedPage, FetchFailure>,
}

impl Coordinator {
    /// Creates a coordinator from its parts
    ///
    /// # Arguments
    ///
    /// * `settings` - Pool size, quota, and discovery bounds
    /// * `fetcher` - HTTP fetcher shared by every unit
    /// * `extractor` - Extraction variant for the run
    /// * `generator` - Candidate URL source for every job
    /// * `store` - Checkpoint backend; the coordinator becomes its only writer
    pub fn new(
        settings: HarvestConfig,
        fetcher: PageFetcher,
        extractor: Arc<dyn Extractor>,
        generator: SourceGenerator,
        store: Box<dyn ProgressStore>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            extractor,
            generator,
            store,
            cancel: CancellationToken::new(),
        }
    }

    /// Builds a coordinator for a loaded configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client or URL generator could not be built
    pub fn from_config(config: &Config, store: Box<dyn ProgressStore>) -> Result<Self, HarvestError> {
        let fetcher = PageFetcher::new(Duration::from_secs(config.harvest.fetch_timeout_secs))?;
        let extractor = build_extractor(
            config.harvest.variant,
            config.search.candidate_filter.as_deref(),
        );
        let generator = SourceGenerator::from_config(config)?;

        Ok(Self::new(
            config.harvest.clone(),
            fetcher,
            extractor,
            generator,
            store,
        ))
    }

    /// Replaces the cancellation token, e.g. with one wired to Ctrl+C
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The checkpoint backend, for read-only inspection
    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    /// Runs every job in order
    ///
    /// Jobs not started because of an interrupt or the record ceiling are
    /// reported as `Pending`. The checkpoint is deleted only when every job
    /// completed.
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - The run finished, stopped at its quota, or was interrupted
    /// * `Err(RunAborted)` - A checkpoint read or write failed; carries the
    ///   records collected before the failure
    pub async fn run(&mut self, jobs: &[Job]) -> Result<RunReport, RunAborted> {
        let started_at = Utc::now();
        let mut run = Run::default();

        match self.run_jobs(&mut run, jobs).await {
            Ok(outcome) => Ok(RunReport {
                jobs: run.reports,
                result: run.result,
                outcome,
                started_at,
                finished_at: Utc::now(),
            }),
            Err(error) => {
                tracing::error!(
                    "Run aborted with {} records collected: {}",
                    run.result.count(),
                    error
                );
                Err(RunAborted {
                    error,
                    result: run.result,
                })
            }
        }
    }

    async fn run_jobs(&mut self, run: &mut Run, jobs: &[Job]) -> Result<RunOutcome, HarvestError> {
        tracing::info!(
            "Starting run: {} jobs, {} workers, {} extractor",
            jobs.len(),
            self.workers(),
            self.extractor.name()
        );

        for (position, job) in jobs.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!("Interrupted before {}", job);
                break;
            }
            if self.quota_reached(&run.result) {
                tracing::info!(
                    "Record ceiling reached, {} jobs left pending",
                    jobs.len() - position
                );
                break;
            }

            let report = match self.settings.mode {
                HarvestMode::Paginate => self.run_pagination(run, job).await?,
                HarvestMode::Search | HarvestMode::Crawl => self.run_job(run, job).await?,
            };
            run.reports.push(report);
        }

        let started = run.reports.len();
        run.reports
            .extend(jobs[started..].iter().cloned().map(JobReport::pending));

        let outcome = RunOutcome::from_jobs(&run.reports, self.cancel.is_cancelled());
        if outcome == RunOutcome::Completed {
            self.store.delete_all()?;
            tracing::info!("All jobs completed, checkpoint removed");
        }

        tracing::info!(
            "Run {}: {} pages claimed, {} contacts, {} listings",
            outcome,
            run.frontier.visited_len(),
            run.result.contact_count(),
            run.result.listing_count()
        );

        Ok(outcome)
    }

    /// Drains one job through the worker pool
    async fn run_job(&mut self, run: &mut Run, job: &Job) -> Result<JobReport, HarvestError> {
        let mut state = JobState::Pending.transition(JobState::Running)?;
        let key = job.key();
        let start = self.store.load(&key)?.unwrap_or(0);
        let total = self
            .generator
            .candidate_count(job.engine, self.settings.results_per_engine);
        let keyword: Arc<str> = Arc::from(job.keyword.as_str());
        let workers = self.workers();

        if start > 0 {
            tracing::info!("Resuming {} at index {} of {}", job, start, total);
        } else {
            tracing::info!("Starting {} ({} candidate pages)", job, total);
        }

        let mut cursor = JobCursor::new(key, start);
        let mut stats = JobStats {
            resumed_from: start,
            ..JobStats::default()
        };
        let mut next_index = start;
        let mut discovered = 0u64;
        let mut in_flight: JoinSet<UnitOutcome> = JoinSet::new();
        let mut stop: Option<JobState> = None;

        loop {
            while stop.is_none() && in_flight.len() < workers {
                if next_index >= total && run.frontier.pending_len() == 0 {
                    break;
                }
                if let Some(reason) = self.stop_reason(&run.result) {
                    tracing::info!("Stopping submissions for {}: {}", job, reason);
                    stop = Some(reason);
                    break;
                }

                let unit = if next_index < total {
                    let index = next_index;
                    next_index += 1;
                    match self.generator.url_at(&job.keyword, job.engine, index) {
                        Some(url) => Unit {
                            index: Some(index),
                            url,
                        },
                        None => {
                            self.complete_index(&mut cursor, index)?;
                            continue;
                        }
                    }
                } else {
                    match run.frontier.pop_pending() {
                        Some(url) => Unit { index: None, url },
                        None => break,
                    }
                };

                if !run.frontier.try_claim(&unit.url) {
                    tracing::debug!("Already claimed: {}", unit.url);
                    stats.skipped += 1;
                    if let Some(index) = unit.index {
                        self.complete_index(&mut cursor, index)?;
                    }
                    continue;
                }

                tracing::trace!("Dispatching {}", unit.url);
                stats.dispatched += 1;
                in_flight.spawn(process_unit(
                    self.fetcher.clone(),
                    Arc::clone(&self.extractor),
                    Arc::clone(&keyword),
                    unit,
                    false,
                ));
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            match joined {
                Ok(outcome) => {
                    let index = outcome.unit.index;
                    self.absorb(run, outcome, &mut stats, &mut discovered);
                    if let Some(index) = index {
                        self.complete_index(&mut cursor, index)?;
                    }
                }
                Err(e) => {
                    tracing::error!("Unit task of {} failed: {}", job, e);
                    stats.failed += 1;
                }
            }

            let done = stats.succeeded + stats.failed;
            if done % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress on {}: {} units done, {} in flight, {} records",
                    job,
                    done,
                    in_flight.len(),
                    run.result.count()
                );
            }
        }

        run.frontier.clear_pending();

        let mut end = stop.unwrap_or(JobState::Completed);
        if end == JobState::Completed && cursor.next_index < total {
            tracing::error!(
                "{} has an unfinished unit at index {}, leaving it resumable",
                job,
                cursor.next_index
            );
            end = JobState::Interrupted;
        }
        state = state.transition(end)?;

        // A completed job keeps its cursor at `total` until the whole run completes
        if state == JobState::Completed {
            tracing::info!(
                "Completed {}: {} units, {} failed, {} new records",
                job,
                stats.dispatched,
                stats.failed,
                stats.new_records
            );
        } else {
            tracing::info!(
                "{} stopped ({}), resume point {}",
                job,
                state,
                cursor.next_index
            );
        }

        Ok(JobReport {
            job: job.clone(),
            state,
            stats,
        })
    }

    /// Follows "next page" links from each seed, one page at a time
    ///
    /// Chains are not checkpointed: a chain position cannot be regenerated
    /// without refetching the pages before it.
    async fn run_pagination(&mut self, run: &mut Run, job: &Job) -> Result<JobReport, HarvestError> {
        let mut state = JobState::Pending.transition(JobState::Running)?;
        let keyword: Arc<str> = Arc::from(job.keyword.as_str());
        let max_pages = u64::from(self.settings.max_pagination_pages);
        let mut stats = JobStats::default();
        let mut discovered = 0u64;
        let mut stop: Option<JobState> = None;

        tracing::info!(
            "Starting pagination of {} seeds for {}",
            self.generator.seeds().len(),
            job
        );

        'seeds: for seed in self.generator.seeds().to_vec() {
            let mut current = seed;
            let mut pages = 0u64;

            loop {
                if let Some(reason) = self.stop_reason(&run.result) {
                    stop = Some(reason);
                    break 'seeds;
                }
                if pages >= max_pages {
                    tracing::info!("Pagination limit of {} pages reached at {}", max_pages, current);
                    break;
                }
                if !run.frontier.try_claim(&current) {
                    tracing::debug!("Pagination reached a claimed page: {}", current);
                    stats.skipped += 1;
                    break;
                }

                pages += 1;
                stats.dispatched += 1;

                let outcome = process_unit(
                    self.fetcher.clone(),
                    Arc::clone(&self.extractor),
                    Arc::clone(&keyword),
                    Unit {
                        index: None,
                        url: current.clone(),
                    },
                    true,
                )
                .await;
                let next = outcome
                    .page
                    .as_ref()
                    .ok()
                    .and_then(|page| page.next_page.clone());
                self.absorb(run, outcome, &mut stats, &mut discovered);

                let Some(next) = next else {
                    tracing::debug!("No next page after {}", current);
                    break;
                };
                if frontier_key(&next) == frontier_key(&current) {
                    tracing::debug!("Next link of {} points back to itself", current);
                    break;
                }
                current = next;
            }
        }

        state = state.transition(stop.unwrap_or(JobState::Completed))?;
        tracing::info!(
            "Pagination {}: {} pages, {} new records",
            state,
            stats.dispatched,
            stats.new_records
        );

        Ok(JobReport {
            job: job.clone(),
            state,
            stats,
        })
    }

    /// Merges one finished unit into the run and queues what it discovered
    fn absorb(&self, run: &mut Run, outcome: UnitOutcome, stats: &mut JobStats, discovered: &mut u64) {
        let page = match outcome.page {
            Ok(page) => page,
            Err(reason) => {
                tracing::warn!("Failed to fetch {}: {}", outcome.unit.url, reason);
                stats.failed += 1;
                return;
            }
        };

        stats.succeeded += 1;

        let Extraction {
            contacts,
            links,
            candidates,
            listings,
        } = page.extraction;

        let added = run.result.merge(contacts, listings) as u64;
        stats.new_records += added;
        if added > 0 {
            tracing::debug!(
                "{} new records from {} ({} total)",
                added,
                page.final_url,
                run.result.count()
            );
        }

        if !self.settings.follow_links {
            return;
        }

        let follow = match self.settings.mode {
            HarvestMode::Crawl => match Url::parse(&page.final_url) {
                Ok(origin) => same_site_links(&links, &origin),
                Err(_) => Vec::new(),
            },
            HarvestMode::Search => candidates,
            HarvestMode::Paginate => Vec::new(),
        };

        let limit = u64::from(self.settings.max_pages_per_job);
        for url in follow {
            if *discovered >= limit {
                tracing::debug!("Discovery limit of {} pages reached", limit);
                break;
            }
            if run.frontier.push_pending(url) {
                *discovered += 1;
            }
        }
    }

    /// Marks an indexed unit done and persists the cursor if it moved
    ///
    /// A failed write aborts the run.
    fn complete_index(&mut self, cursor: &mut JobCursor, index: u64) -> Result<(), HarvestError> {
        if cursor.complete(index) {
            self.store.save(&cursor.key, cursor.next_index)?;
            tracing::debug!("Checkpoint {} -> {}", cursor.key, cursor.next_index);
        }
        Ok(())
    }

    fn stop_reason(&self, result: &RunResult) -> Option<JobState> {
        if self.cancel.is_cancelled() {
            Some(JobState::Interrupted)
        } else if self.quota_reached(result) {
            Some(JobState::QuotaStopped)
        } else {
            None
        }
    }

    fn quota_reached(&self, result: &RunResult) -> bool {
        self.settings
            .contact_limit
            .is_some_and(|limit| result.count() >= limit)
    }

    fn workers(&self) -> usize {
        self.settings.max_workers.max(1) as usize
    }
}

/// Fetches and extracts one URL
///
/// Runs on a pool task; touches no shared run state.
async fn process_unit(
    fetcher: PageFetcher,
    extractor: Arc<dyn Extractor>,
    keyword: Arc<str>,
    unit: Unit,
    locate_next: bool,
) -> UnitOutcome {
    let page = match fetcher.fetch(&unit.url).await {
        FetchResult::Success {
            body, final_url, ..
        } => {
            let extraction = extractor.extract(&Page {
                url: &final_url,
                body: &body,
                keyword: &keyword,
            });
            let next_page = if locate_next {
                Url::parse(&final_url)
                    .ok()
                    .and_then(|base| find_next_page(&body, &base))
                    .map(|next| next.to_string())
            } else {
                None
            };
            Ok(FetchedPage {
                final_url,
                extraction,
                next_page,
            })
        }
        FetchResult::Failure { reason } => Err(reason),
    };

    UnitOutcome { unit, page }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorVariant;
    use crate::crawler::source::EngineId;
    use crate::extract::GenericExtractor;
    use crate::storage::MemoryProgressStore;

    fn create_test_settings() -> HarvestConfig {
        HarvestConfig {
            mode: HarvestMode::Crawl,
            variant: ExtractorVariant::Generic,
            max_workers: 2,
            contact_limit: None,
            fetch_timeout_secs: 2,
            results_per_engine: 10,
            follow_links: false,
            max_pages_per_job: 10,
            max_pagination_pages: 10,
        }
    }

    fn coordinator(seeds: Vec<String>, store: MemoryProgressStore) -> Coordinator {
        Coordinator::new(
            create_test_settings(),
            PageFetcher::new(Duration::from_secs(2)).unwrap(),
            Arc::new(GenericExtractor::new(None)),
            SourceGenerator::new("{keyword}").with_seeds(seeds),
            Box::new(store),
        )
    }

    #[test]
    fn test_cursor_in_order() {
        let mut cursor = JobCursor::new(JobKey::new("acme corp", "google"), 0);
        assert!(cursor.complete(0));
        assert!(cursor.complete(1));
        assert_eq!(cursor.next_index, 2);
    }

    #[test]
    fn test_cursor_waits_for_gap() {
        let mut cursor = JobCursor::new(JobKey::new("acme corp", "google"), 3);
        assert!(!cursor.complete(5));
        assert!(!cursor.complete(4));
        assert_eq!(cursor.next_index, 3);

        assert!(cursor.complete(3));
        assert_eq!(cursor.next_index, 6);

        // Indices below the watermark never move it back
        assert!(!cursor.complete(1));
        assert_eq!(cursor.next_index, 6);
    }

    #[tokio::test]
    async fn test_empty_run_completes_and_deletes_checkpoint() {
        let store = MemoryProgressStore::new();
        let mut stale = store.clone();
        stale.save(&JobKey::new("old", "google"), 4).unwrap();

        let mut coordinator = coordinator(Vec::new(), store.clone());
        let report = coordinator.run(&[]).await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert!(report.jobs.is_empty());
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_leaves_jobs_pending() {
        let store = MemoryProgressStore::new();
        let mut coordinator = coordinator(vec!["http://127.0.0.1:9/".to_string()], store.clone());
        coordinator.cancellation_token().cancel();

        let jobs = vec![Job::new("seeds", EngineId::SeedList)];
        let report = coordinator.run(&jobs).await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Interrupted);
        assert_eq!(report.jobs[0].state, JobState::Pending);
        assert_eq!(report.totals().dispatched, 0);
    }

    #[tokio::test]
    async fn test_duplicate_seeds_claimed_once() {
        let store = MemoryProgressStore::new();
        let seeds = vec![
            "http://127.0.0.1:9/contact".to_string(),
            "http://127.0.0.1:9/contact/".to_string(),
            "http://127.0.0.1:9/about".to_string(),
        ];
        let mut coordinator = coordinator(seeds, store.clone());

        let jobs = vec![Job::new("seeds", EngineId::SeedList)];
        let report = coordinator.run(&jobs).await.unwrap();

        let stats = report.jobs[0].stats;
        assert_eq!(report.jobs[0].state, JobState::Completed);
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 2);
        assert!(store.snapshot().unwrap().is_empty());
    }
}
