use crate::config::types::{Config, CrawlConfig, HarvestConfig, HarvestMode, OutputConfig, SearchConfig};
use crate::crawler::EngineId;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_output_config(&config.output)?;

    match config.harvest.mode {
        HarvestMode::Search => validate_search_config(&config.search)?,
        HarvestMode::Crawl | HarvestMode::Paginate => validate_crawl_config(&config.crawl)?,
    }

    if let Some(filter) = &config.search.candidate_filter {
        validate_candidate_filter(filter)?;
    }

    Ok(())
}

/// Validates worker pool, timeout, and bounds
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 64, got {}",
            config.max_workers
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.results_per_engine < 1 {
        return Err(ConfigError::Validation(
            "results-per-engine must be >= 1".to_string(),
        ));
    }

    if config.max_pagination_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pagination-pages must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint-path cannot be empty".to_string(),
        ));
    }

    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(p) if p.is_empty()) {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates keywords, engines, query template, and base URL overrides
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "search mode needs at least one keyword (keywords or keywords-file)".to_string(),
        ));
    }

    if config.engines.is_empty() {
        return Err(ConfigError::Validation(
            "search mode needs at least one engine".to_string(),
        ));
    }

    for name in &config.engines {
        let engine = EngineId::from_name(name)
            .ok_or_else(|| ConfigError::UnknownEngine(name.clone()))?;
        if engine == EngineId::SeedList {
            return Err(ConfigError::Validation(
                "the seeds source is only available in crawl mode".to_string(),
            ));
        }
    }

    if let Some(template) = &config.query_template {
        if !template.contains("{keyword}") {
            return Err(ConfigError::Validation(format!(
                "query-template must contain {{keyword}}, got '{}'",
                template
            )));
        }
    }

    for (name, base) in &config.base_urls {
        if EngineId::from_name(name).is_none() {
            return Err(ConfigError::UnknownEngine(name.clone()));
        }
        validate_http_url(base)?;
    }

    Ok(())
}

/// Validates the seed list used by crawl and paginate modes
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "crawl and paginate modes need at least one seed URL".to_string(),
        ));
    }

    if config.label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawl label cannot be empty".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_http_url(seed)?;
    }

    Ok(())
}

fn validate_http_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "URL '{}' must use http or https",
            raw
        )));
    }

    Ok(())
}

/// Validates a candidate filter such as "*.linkedin.com/in"
fn validate_candidate_filter(filter: &str) -> Result<(), ConfigError> {
    let host = filter.split('/').next().unwrap_or_default();
    validate_domain_pattern(host)
}

/// Validates a domain pattern (supports a leading "*." wildcard)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' is malformed",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
