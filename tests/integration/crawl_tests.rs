//! Integration tests for the harvest coordinator
//!
//! These tests use wiremock to stand in for search engines and websites and
//! drive complete runs end-to-end, including interruption and resumption.

use contact_harvester::config::{
    CheckpointBackend, Config, CrawlConfig, ExtractorVariant, HarvestConfig, HarvestMode,
    OutputConfig, SearchConfig,
};
use contact_harvester::crawler::{plan_jobs, Coordinator, PageFetcher, RunOutcome, SourceGenerator};
use contact_harvester::extract::{Extraction, Extractor, GenericExtractor, Page};
use contact_harvester::output::write_csv_report;
use contact_harvester::state::{JobKey, JobState};
use contact_harvester::storage::{
    CheckpointSnapshot, JsonProgressStore, MemoryProgressStore, ProgressStore, StorageError,
    StorageResult,
};
use contact_harvester::{ContactKind, HarvestError};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a search-mode configuration pointing google at a mock server
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        harvest: HarvestConfig {
            mode: HarvestMode::Search,
            variant: ExtractorVariant::Generic,
            max_workers: 1,
            contact_limit: None,
            fetch_timeout_secs: 5,
            results_per_engine: 20,
            follow_links: false,
            max_pages_per_job: 50,
            max_pagination_pages: 10,
        },
        search: SearchConfig {
            keywords: vec!["acme corp".to_string()],
            engines: vec!["google".to_string()],
            base_urls: BTreeMap::from([("google".to_string(), base_url.to_string())]),
            ..Default::default()
        },
        crawl: CrawlConfig::default(),
        output: OutputConfig {
            checkpoint_path: dir.join("progress.json").display().to_string(),
            checkpoint_backend: CheckpointBackend::Json,
            report_path: dir.join("contacts.csv").display().to_string(),
            summary_path: None,
        },
    }
}

/// Switches a configuration to crawl or paginate mode over the given seeds
fn with_seeds(mut config: Config, mode: HarvestMode, seeds: Vec<String>) -> Config {
    config.harvest.mode = mode;
    config.crawl.seeds = seeds;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

/// The `start` offsets of every search request the server received
async fn received_offsets(server: &MockServer) -> Vec<u64> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "start")
                .and_then(|(_, value)| value.parse().ok())
        })
        .collect()
}

async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

/// Answers every result page with one email unique to its offset
struct EmailPerPage;

impl Respond for EmailPerPage {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let start = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "start")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        html(&format!("<p>user{}@acme.com</p>", start))
    }
}

/// Answers every result page with three emails unique to its offset
struct ThreeEmailsPerPage;

impl Respond for ThreeEmailsPerPage {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let start = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "start")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        html(&format!(
            "<p>sales{0}@acme.com</p><p>help{0}@acme.com</p><p>jobs{0}@acme.com</p>",
            start
        ))
    }
}

/// Generic extraction that panics on pages whose URL contains a marker
struct PanicOn {
    inner: GenericExtractor,
    marker: &'static str,
}

impl Extractor for PanicOn {
    fn extract(&self, page: &Page<'_>) -> Extraction {
        if page.url.contains(self.marker) {
            panic!("extractor crashed on {}", page.url);
        }
        self.inner.extract(page)
    }

    fn name(&self) -> &'static str {
        "panic-on"
    }
}

/// Generic extraction that raises the interrupt once it has seen a marker URL
struct CancelAfter {
    inner: GenericExtractor,
    marker: &'static str,
    token: CancellationToken,
}

impl Extractor for CancelAfter {
    fn extract(&self, page: &Page<'_>) -> Extraction {
        let extraction = self.inner.extract(page);
        if page.url.contains(self.marker) {
            self.token.cancel();
        }
        extraction
    }

    fn name(&self) -> &'static str {
        "cancel-after"
    }
}

/// In-memory store that records every cursor write
#[derive(Clone, Default)]
struct RecordingStore {
    inner: MemoryProgressStore,
    saves: Arc<Mutex<Vec<u64>>>,
}

impl ProgressStore for RecordingStore {
    fn load(&self, job: &JobKey) -> StorageResult<Option<u64>> {
        self.inner.load(job)
    }

    fn save(&mut self, job: &JobKey, next_index: u64) -> StorageResult<()> {
        self.saves.lock().unwrap().push(next_index);
        self.inner.save(job, next_index)
    }

    fn delete_all(&mut self) -> StorageResult<()> {
        self.inner.delete_all()
    }

    fn snapshot(&self) -> StorageResult<CheckpointSnapshot> {
        self.inner.snapshot()
    }
}

/// Store whose writes always fail, like a full disk
struct FailingStore;

impl ProgressStore for FailingStore {
    fn load(&self, _job: &JobKey) -> StorageResult<Option<u64>> {
        Ok(None)
    }

    fn save(&mut self, _job: &JobKey, _next_index: u64) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "No space left on device",
        )))
    }

    fn delete_all(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn snapshot(&self) -> StorageResult<CheckpointSnapshot> {
        Ok(CheckpointSnapshot::new())
    }
}

#[tokio::test]
async fn test_acme_corp_scenario() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("start", "0"))
        .respond_with(html("<p>Email: a@acme.com</p><p>Call +1-555-0100</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("start", "10"))
        .respond_with(html("<p>a@acme.com</p><p>b@acme.com</p>"))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), dir.path());
    config.harvest.contact_limit = Some(3);

    let store = RecordingStore::default();
    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator = Coordinator::from_config(&config, Box::new(store.clone())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    assert_eq!(report.result.count(), 3);
    assert!(report.result.contains(ContactKind::Email, "a@acme.com"));
    assert!(report.result.contains(ContactKind::Email, "b@acme.com"));
    assert!(report.result.contains(ContactKind::Phone, "+1-555-0100"));

    // Cursor advanced after each page, then removed once the whole run completed
    assert_eq!(*store.saves.lock().unwrap(), vec![1, 2]);
    assert!(store.snapshot().unwrap().is_empty());
    assert_eq!(report.jobs[0].state, JobState::Completed);
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(received_offsets(&server).await, vec![0, 10]);

    let report_path = Path::new(&config.output.report_path);
    assert_eq!(write_csv_report(&report.result, report_path).unwrap(), 3);
    let csv = std::fs::read_to_string(report_path).unwrap();
    assert!(csv.contains("EMAIL,b@acme.com,acme corp"));
}

#[tokio::test]
async fn test_interrupt_leaves_resumable_checkpoint() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(EmailPerPage)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), dir.path());
    config.harvest.results_per_engine = 50;
    let checkpoint = Path::new(&config.output.checkpoint_path).to_path_buf();
    let jobs = plan_jobs(&config).unwrap();

    // First run: interrupt once the page at index 1 has been processed
    let token = CancellationToken::new();
    let extractor = CancelAfter {
        inner: GenericExtractor::new(None),
        marker: "start=10",
        token: token.clone(),
    };
    let mut coordinator = Coordinator::new(
        config.harvest.clone(),
        PageFetcher::new(Duration::from_secs(5)).unwrap(),
        Arc::new(extractor),
        SourceGenerator::from_config(&config).unwrap(),
        Box::new(JsonProgressStore::open(&checkpoint).unwrap()),
    )
    .with_cancellation(token);

    let first = coordinator.run(&jobs).await.unwrap();
    assert_eq!(first.outcome, RunOutcome::Interrupted);
    assert_eq!(first.jobs[0].state, JobState::Interrupted);
    assert_eq!(received_offsets(&server).await, vec![0, 10]);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&checkpoint).unwrap()).unwrap();
    assert_eq!(raw["acme corp"]["google"], 2);

    // Second run resumes at index 2 and never refetches 0 or 1
    let store = JsonProgressStore::open(&checkpoint).unwrap();
    let mut coordinator = Coordinator::from_config(&config, Box::new(store)).unwrap();
    let second = coordinator.run(&jobs).await.unwrap();

    assert_eq!(second.outcome, RunOutcome::Completed);
    assert_eq!(second.jobs[0].stats.resumed_from, 2);
    assert_eq!(received_offsets(&server).await, vec![0, 10, 20, 30, 40]);
    assert!(!checkpoint.exists());

    // Everything found before the interrupt is also in the union of both runs
    let mut combined = first.result.clone();
    combined.absorb(second.result);
    for contact in first.result.contacts() {
        assert!(combined.contains(contact.kind, &contact.value));
    }
    assert_eq!(combined.contact_count(), 5);
}

#[tokio::test]
async fn test_quota_overshoot_is_bounded_in_units() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ThreeEmailsPerPage)
        .mount(&server)
        .await;

    let workers: u32 = 4;
    let ceiling: u64 = 5;
    let per_page: u64 = 3;
    let mut config = create_test_config(&server.uri(), dir.path());
    config.harvest.max_workers = workers;
    config.harvest.contact_limit = Some(ceiling);
    config.harvest.results_per_engine = 200;

    let store = MemoryProgressStore::new();
    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator = Coordinator::from_config(&config, Box::new(store.clone())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    // Once the ceiling is seen, at most `workers - 1` units are still in flight
    let units_to_reach_ceiling = ceiling.div_ceil(per_page);
    let dispatched = report.jobs[0].stats.dispatched;
    assert!(dispatched >= units_to_reach_ceiling);
    assert!(
        dispatched <= units_to_reach_ceiling + u64::from(workers) - 1,
        "dispatched {} units",
        dispatched
    );
    assert!(report.result.count() >= ceiling);
    assert_eq!(report.result.count(), dispatched * per_page);
    assert_eq!(report.outcome, RunOutcome::QuotaStopped);
    assert_eq!(report.jobs[0].state, JobState::QuotaStopped);

    // Every dispatched unit finished, so the cursor sits right after them
    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot["acme corp"]["google"], dispatched);
}

#[tokio::test]
async fn test_single_unit_can_overshoot_ceiling() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ThreeEmailsPerPage)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), dir.path());
    config.harvest.contact_limit = Some(1);
    config.harvest.results_per_engine = 50;

    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator =
        Coordinator::from_config(&config, Box::new(MemoryProgressStore::new())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    // The ceiling stops submissions; records of a finished page are all kept
    assert_eq!(report.jobs[0].stats.dispatched, 1);
    assert_eq!(report.result.count(), 3);
    assert_eq!(report.outcome, RunOutcome::QuotaStopped);
}

#[tokio::test]
async fn test_completed_job_is_not_refetched_on_resume() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html("<p>sales@acme.com</p>"))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), dir.path());
    config.search.engines = vec!["google".to_string(), "bing".to_string()];
    config
        .search
        .base_urls
        .insert("bing".to_string(), server.uri());
    let jobs = plan_jobs(&config).unwrap();
    let store = MemoryProgressStore::new();

    // First run: google completes, bing is interrupted after its first page
    let token = CancellationToken::new();
    let extractor = CancelAfter {
        inner: GenericExtractor::new(None),
        marker: "first=0",
        token: token.clone(),
    };
    let mut coordinator = Coordinator::new(
        config.harvest.clone(),
        PageFetcher::new(Duration::from_secs(5)).unwrap(),
        Arc::new(extractor),
        SourceGenerator::from_config(&config).unwrap(),
        Box::new(store.clone()),
    )
    .with_cancellation(token);

    let first = coordinator.run(&jobs).await.unwrap();
    assert_eq!(first.outcome, RunOutcome::Interrupted);
    assert_eq!(first.jobs[0].state, JobState::Completed);
    assert_eq!(first.jobs[1].state, JobState::Interrupted);
    assert_eq!(received_offsets(&server).await, vec![0, 10]);

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot["acme corp"]["google"], 2);
    assert_eq!(snapshot["acme corp"]["bing"], 1);

    // Second run: google has nothing left, bing picks up at its second page
    let mut coordinator = Coordinator::from_config(&config, Box::new(store.clone())).unwrap();
    let second = coordinator.run(&jobs).await.unwrap();

    assert_eq!(second.outcome, RunOutcome::Completed);
    assert_eq!(second.jobs[0].stats.dispatched, 0);
    assert_eq!(second.jobs[1].stats.resumed_from, 1);
    assert_eq!(second.jobs[1].stats.dispatched, 1);
    assert_eq!(received_offsets(&server).await, vec![0, 10]);
    assert!(store.snapshot().unwrap().is_empty());
}

#[tokio::test]
async fn test_crashed_unit_is_retried_on_resume() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(EmailPerPage)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), dir.path());
    config.harvest.results_per_engine = 30;
    let jobs = plan_jobs(&config).unwrap();
    let store = MemoryProgressStore::new();

    let extractor = PanicOn {
        inner: GenericExtractor::new(None),
        marker: "start=10",
    };
    let mut coordinator = Coordinator::new(
        config.harvest.clone(),
        PageFetcher::new(Duration::from_secs(5)).unwrap(),
        Arc::new(extractor),
        SourceGenerator::from_config(&config).unwrap(),
        Box::new(store.clone()),
    );

    let first = coordinator.run(&jobs).await.unwrap();
    assert_eq!(first.jobs[0].state, JobState::Interrupted);
    assert_eq!(first.jobs[0].stats.failed, 1);
    assert_eq!(first.outcome, RunOutcome::Interrupted);
    assert_eq!(received_offsets(&server).await, vec![0, 10, 20]);
    assert_eq!(store.snapshot().unwrap()["acme corp"]["google"], 1);

    let mut coordinator = Coordinator::from_config(&config, Box::new(store.clone())).unwrap();
    let second = coordinator.run(&jobs).await.unwrap();

    assert_eq!(second.outcome, RunOutcome::Completed);
    assert!(second.result.contains(ContactKind::Email, "user10@acme.com"));
    assert_eq!(received_offsets(&server).await, vec![0, 10, 20, 10, 20]);
}

#[tokio::test]
async fn test_quota_skips_remaining_jobs() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html("<p>sales@acme.com</p><p>help@acme.com</p>"))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), dir.path());
    config.harvest.contact_limit = Some(2);
    config.harvest.results_per_engine = 10;
    config.search.keywords.push("globex".to_string());

    let store = MemoryProgressStore::new();
    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator = Coordinator::from_config(&config, Box::new(store.clone())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    assert_eq!(report.jobs.len(), 2);
    assert_eq!(report.jobs[0].state, JobState::Completed);
    assert_eq!(report.jobs[1].state, JobState::Pending);
    assert_eq!(report.outcome, RunOutcome::QuotaStopped);
    assert_eq!(received_offsets(&server).await, vec![0]);
}

#[tokio::test]
async fn test_checkpoint_write_failure_aborts_run() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(EmailPerPage)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator = Coordinator::from_config(&config, Box::new(FailingStore)).unwrap();

    let aborted = coordinator.run(&jobs).await.unwrap_err();
    assert!(matches!(aborted.error, HarvestError::Checkpoint(_)));

    // The page merged before the failed write is still reportable
    assert!(aborted.result.contains(ContactKind::Email, "user0@acme.com"));
    let report_path = dir.path().join("partial.csv");
    assert_eq!(write_csv_report(&aborted.result, &report_path).unwrap(), 1);
}

#[tokio::test]
async fn test_failed_pages_still_advance_cursor() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("start", "10"))
        .respond_with(html("<p>b@acme.com</p>"))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let store = RecordingStore::default();
    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator = Coordinator::from_config(&config, Box::new(store.clone())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    assert_eq!(report.jobs[0].stats.failed, 1);
    assert_eq!(report.jobs[0].stats.succeeded, 1);
    assert_eq!(report.result.contact_count(), 1);
    assert_eq!(*store.saves.lock().unwrap(), vec![1, 2]);
    assert_eq!(report.outcome, RunOutcome::Completed);
}

#[tokio::test]
async fn test_crawl_mode_follows_same_site_links() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/team">Team</a>
               <a href="/about">About</a>
               <a href="https://partner.example.org/contact">Partner</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/team"))
        .respond_with(html(r#"<p>team@acme.com</p><a href="/">Home</a><a href="/about">About</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<p>Call +1-555-0100</p>"))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let mut config = with_seeds(config, HarvestMode::Crawl, vec![format!("{}/", server.uri())]);
    config.harvest.follow_links = true;
    config.harvest.max_workers = 3;

    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator =
        Coordinator::from_config(&config, Box::new(MemoryProgressStore::new())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    assert!(report.result.contains(ContactKind::Email, "team@acme.com"));
    assert!(report.result.contains(ContactKind::Phone, "+1-555-0100"));
    assert_eq!(report.jobs[0].stats.dispatched, 3);
    assert_eq!(request_count(&server, "/").await, 1);
    assert_eq!(request_count(&server, "/about").await, 1);
    assert_eq!(report.outcome, RunOutcome::Completed);
}

#[tokio::test]
async fn test_crawl_discovery_is_bounded_per_job() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html("<p>nothing here</p>"))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let mut config = with_seeds(config, HarvestMode::Crawl, vec![format!("{}/", server.uri())]);
    config.harvest.follow_links = true;
    config.harvest.max_pages_per_job = 1;

    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator =
        Coordinator::from_config(&config, Box::new(MemoryProgressStore::new())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    assert_eq!(report.jobs[0].stats.dispatched, 2);
    assert_eq!(request_count(&server, "/a").await, 1);
    assert_eq!(request_count(&server, "/b").await, 0);
}

#[tokio::test]
async fn test_pagination_cycle_guard() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "1"))
        .respond_with(html(r#"<p>one@acme.com</p><a href="/list?page=2">Next page</a>"#))
        .mount(&server)
        .await;
    // The last page links to itself
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "2"))
        .respond_with(html(r#"<p>two@acme.com</p><a href="/list?page=2">Next</a>"#))
        .mount(&server)
        .await;
    // Two pages linking to each other
    Mock::given(method("GET"))
        .and(path("/loop/a"))
        .respond_with(html(r#"<p>a@globex.com</p><a href="/loop/b">Older posts</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/loop/b"))
        .respond_with(html(r#"<p>b@globex.com</p><a href="/loop/a">Older posts</a>"#))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let config = with_seeds(
        config,
        HarvestMode::Paginate,
        vec![
            format!("{}/list?page=1", server.uri()),
            format!("{}/loop/a", server.uri()),
        ],
    );

    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator =
        Coordinator::from_config(&config, Box::new(MemoryProgressStore::new())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    assert_eq!(request_count(&server, "/list").await, 2);
    assert_eq!(request_count(&server, "/loop/a").await, 1);
    assert_eq!(request_count(&server, "/loop/b").await, 1);
    assert_eq!(report.result.contact_count(), 4);
    assert_eq!(report.jobs[0].stats.skipped, 1);
    assert_eq!(report.outcome, RunOutcome::Completed);
}

#[tokio::test]
async fn test_pagination_page_limit() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(EchoNextPage)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let mut config = with_seeds(
        config,
        HarvestMode::Paginate,
        vec![format!("{}/feed?page=1", server.uri())],
    );
    config.harvest.max_pagination_pages = 3;

    let jobs = plan_jobs(&config).unwrap();
    let mut coordinator =
        Coordinator::from_config(&config, Box::new(MemoryProgressStore::new())).unwrap();
    let report = coordinator.run(&jobs).await.unwrap();

    assert_eq!(request_count(&server, "/feed").await, 3);
    assert_eq!(report.jobs[0].stats.dispatched, 3);
}

/// An endless feed: page n links to page n + 1
struct EchoNextPage;

impl Respond for EchoNextPage {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let page: u64 = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(1);
        html(&format!(r#"<a href="/feed?page={}">Next</a>"#, page + 1))
    }
}
