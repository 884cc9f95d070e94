use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for a harvesting run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

/// How units of work are discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarvestMode {
    /// Keywords x engines, result pages generated by offset
    Search,
    /// A seed list, optionally following same-site links
    Crawl,
    /// Follow "next page" links from each start URL
    Paginate,
}

/// Which extractor turns page bodies into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorVariant {
    Generic,
    Profile,
    Listing,
}

/// Worker pool, quota, and fetch behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    #[serde(default = "default_mode")]
    pub mode: HarvestMode,

    #[serde(default = "default_variant")]
    pub variant: ExtractorVariant,

    /// Maximum number of concurrent fetches within a job
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,

    /// Stop submitting new work once this many unique records are collected
    #[serde(rename = "contact-limit", default)]
    pub contact_limit: Option<u64>,

    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Result slots requested per (keyword, engine)
    #[serde(rename = "results-per-engine", default = "default_results_per_engine")]
    pub results_per_engine: u32,

    /// Re-submit same-site links found on fetched pages
    #[serde(rename = "follow-links", default)]
    pub follow_links: bool,

    /// Upper bound on discovered (non-generated) units per job
    #[serde(rename = "max-pages-per-job", default = "default_max_pages_per_job")]
    pub max_pages_per_job: u32,

    /// Upper bound on the length of a pagination chain
    #[serde(rename = "max-pagination-pages", default = "default_max_pagination_pages")]
    pub max_pagination_pages: u32,
}

/// Search-engine discovery settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub keywords: Vec<String>,

    /// File with one keyword per line, appended after `keywords`
    #[serde(rename = "keywords-file", default)]
    pub keywords_file: Option<String>,

    #[serde(default = "default_engines")]
    pub engines: Vec<String>,

    /// Query template; `{keyword}` is substituted
    #[serde(rename = "query-template", default)]
    pub query_template: Option<String>,

    /// Host pattern with optional path prefix, e.g. "*.linkedin.com/in"
    #[serde(rename = "candidate-filter", default)]
    pub candidate_filter: Option<String>,

    /// Geographic term for listing directories
    #[serde(default)]
    pub location: String,

    /// Per-engine base URL overrides
    #[serde(rename = "base-urls", default)]
    pub base_urls: BTreeMap<String, String>,
}

/// Seed-list settings for crawl and paginate modes
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    #[serde(default)]
    pub seeds: Vec<String>,

    #[serde(rename = "seeds-file", default)]
    pub seeds_file: Option<String>,

    /// Keyword under which the seed job is checkpointed
    #[serde(default = "default_label")]
    pub label: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            seeds_file: None,
            label: default_label(),
        }
    }
}

/// Checkpoint storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    Json,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,

    #[serde(rename = "checkpoint-backend", default = "default_backend")]
    pub checkpoint_backend: CheckpointBackend,

    /// Path to the CSV report
    #[serde(rename = "report-path")]
    pub report_path: String,

    /// Path to the markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

fn default_mode() -> HarvestMode {
    HarvestMode::Search
}

fn default_variant() -> ExtractorVariant {
    ExtractorVariant::Generic
}

fn default_max_workers() -> u32 {
    5
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_results_per_engine() -> u32 {
    50
}

fn default_max_pages_per_job() -> u32 {
    500
}

fn default_max_pagination_pages() -> u32 {
    100
}

fn default_engines() -> Vec<String> {
    ["google", "bing", "yahoo", "duckduckgo"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_label() -> String {
    "seeds".to_string()
}

fn default_backend() -> CheckpointBackend {
    CheckpointBackend::Json
}
