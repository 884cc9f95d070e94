//! Candidate URL generation
//!
//! A job's URL sequence is a pure function of (keyword, engine, index): the
//! URL at index `k` is the same on a fresh run and on a resumed one, which is
//! what makes a persisted index a valid resume point.

use crate::config::{Config, ExtractorVariant, HarvestMode};
use crate::state::JobKey;
use crate::ConfigError;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// A source of candidate URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EngineId {
    Google,
    Bing,
    Yahoo,
    DuckDuckGo,
    YellowPages,
    /// The configured seed list, used by crawl and paginate modes
    SeedList,
}

impl EngineId {
    /// Parses an engine from its config name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" => Some(Self::Google),
            "bing" => Some(Self::Bing),
            "yahoo" => Some(Self::Yahoo),
            "duckduckgo" | "ddg" => Some(Self::DuckDuckGo),
            "yellowpages" => Some(Self::YellowPages),
            "seeds" => Some(Self::SeedList),
            _ => None,
        }
    }

    /// Config name, also used as the checkpoint key
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::Yahoo => "yahoo",
            Self::DuckDuckGo => "duckduckgo",
            Self::YellowPages => "yellowpages",
            Self::SeedList => "seeds",
        }
    }

    /// Result slots covered by one generated page
    pub fn page_size(&self) -> u64 {
        match self {
            Self::Google | Self::Bing | Self::Yahoo => 10,
            Self::DuckDuckGo => 50,
            Self::YellowPages | Self::SeedList => 1,
        }
    }

    fn default_base(&self) -> Option<&'static str> {
        match self {
            Self::Google => Some("https://www.google.com"),
            Self::Bing => Some("https://www.bing.com"),
            Self::Yahoo => Some("https://search.yahoo.com"),
            Self::DuckDuckGo => Some("https://duckduckgo.com"),
            Self::YellowPages => Some("https://www.yellowpages.com"),
            Self::SeedList => None,
        }
    }

    pub fn search_engines() -> [EngineId; 5] {
        [
            Self::Google,
            Self::Bing,
            Self::Yahoo,
            Self::DuckDuckGo,
            Self::YellowPages,
        ]
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One (keyword, engine) unit of checkpointing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    pub keyword: String,
    pub engine: EngineId,
}

impl Job {
    pub fn new(keyword: impl Into<String>, engine: EngineId) -> Self {
        Self {
            keyword: keyword.into(),
            engine,
        }
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(self.keyword.clone(), self.engine.name())
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' on {}", self.keyword, self.engine)
    }
}

/// Default search query template for an extractor variant
pub fn default_query_template(variant: ExtractorVariant) -> &'static str {
    match variant {
        ExtractorVariant::Generic => "intitle:\"contact\" AND \"{keyword}\"",
        ExtractorVariant::Profile => "{keyword} site:linkedin.com/in",
        ExtractorVariant::Listing => "{keyword}",
    }
}

/// The ordered job list of a run
///
/// Search mode yields keywords x engines, keyword-major, in configuration
/// order. Crawl and paginate modes yield a single seed-list job checkpointed
/// under the crawl label.
pub fn plan_jobs(config: &Config) -> Result<Vec<Job>, ConfigError> {
    if config.harvest.mode != HarvestMode::Search {
        return Ok(vec![Job::new(config.crawl.label.clone(), EngineId::SeedList)]);
    }

    let engines = config
        .search
        .engines
        .iter()
        .map(|name| EngineId::from_name(name).ok_or_else(|| ConfigError::UnknownEngine(name.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(config
        .search
        .keywords
        .iter()
        .flat_map(|keyword| engines.iter().map(move |engine| Job::new(keyword.clone(), *engine)))
        .collect())
}

/// Deterministic, index-addressable candidate URL generator
#[derive(Debug, Clone)]
pub struct SourceGenerator {
    bases: BTreeMap<EngineId, Url>,
    query_template: String,
    location: String,
    seeds: Vec<String>,
}

impl SourceGenerator {
    /// Creates a generator with the public engine endpoints
    pub fn new(query_template: impl Into<String>) -> Self {
        let bases = EngineId::search_engines()
            .into_iter()
            .filter_map(|engine| {
                let base = Url::parse(engine.default_base()?).ok()?;
                Some((engine, base))
            })
            .collect();

        Self {
            bases,
            query_template: query_template.into(),
            location: String::new(),
            seeds: Vec::new(),
        }
    }

    /// Builds the generator described by a configuration
    ///
    /// # Returns
    ///
    /// * `Ok(SourceGenerator)` - Generator with any base URL overrides applied
    /// * `Err(ConfigError)` - An override names an unknown engine or is not a URL
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let template = config
            .search
            .query_template
            .clone()
            .unwrap_or_else(|| default_query_template(config.harvest.variant).to_string());

        let mut generator = Self::new(template).with_location(config.search.location.clone());

        for (name, base) in &config.search.base_urls {
            let engine =
                EngineId::from_name(name).ok_or_else(|| ConfigError::UnknownEngine(name.clone()))?;
            generator = generator.with_base_url(engine, base)?;
        }

        if config.harvest.mode != HarvestMode::Search {
            generator = generator.with_seeds(config.crawl.seeds.clone());
        }

        Ok(generator)
    }

    /// Points an engine at another host, e.g. a mirror or a test server
    pub fn with_base_url(mut self, engine: EngineId, base: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", base, e)))?;
        self.bases.insert(engine, url);
        Ok(self)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<String>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    /// The search query for a keyword
    pub fn query(&self, keyword: &str) -> String {
        self.query_template.replace("{keyword}", keyword)
    }

    /// Number of candidate URLs for an engine
    ///
    /// `ceil(results / page_size)` for search engines; the seed list length for
    /// [`EngineId::SeedList`].
    pub fn candidate_count(&self, engine: EngineId, results: u32) -> u64 {
        match engine {
            EngineId::SeedList => self.seeds.len() as u64,
            _ => (results as u64).div_ceil(engine.page_size()),
        }
    }

    /// The candidate URL at `index`
    ///
    /// Returns None only for a seed index past the end of the list.
    pub fn url_at(&self, keyword: &str, engine: EngineId, index: u64) -> Option<String> {
        if engine == EngineId::SeedList {
            return usize::try_from(index)
                .ok()
                .and_then(|i| self.seeds.get(i))
                .cloned();
        }

        let mut url = self.bases.get(&engine)?.clone();
        let query = self.query(keyword);
        let offset = index * engine.page_size();

        let (path, params): (&str, Vec<(&str, String)>) = match engine {
            EngineId::Google => ("search", vec![("q", query), ("start", offset.to_string())]),
            EngineId::Bing => ("search", vec![("q", query), ("first", offset.to_string())]),
            EngineId::Yahoo => ("search", vec![("p", query), ("b", (offset + 1).to_string())]),
            EngineId::DuckDuckGo => ("html/", vec![("q", query), ("s", offset.to_string())]),
            EngineId::YellowPages => (
                "search",
                vec![
                    ("search_terms", query),
                    ("geo_location_terms", self.location.clone()),
                    ("page", (index + 1).to_string()),
                ],
            ),
            EngineId::SeedList => return None,
        };

        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", prefix, path));
        url.query_pairs_mut().clear().extend_pairs(params);

        Some(url.to_string())
    }

    /// Generates the first `count` candidate URLs, in index order
    pub fn generate(&self, keyword: &str, engine: EngineId, count: u64) -> Vec<String> {
        (0..count)
            .map_while(|index| self.url_at(keyword, engine, index))
            .collect()
    }
}
