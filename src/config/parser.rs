use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Keyword and seed files named by the configuration are read here, so an
/// unreadable input surfaces before any network work starts. Their entries
/// are appended after the inline `keywords` / `seeds` lists, blank lines and
/// duplicates skipped.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use contact_harvester::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Workers: {}", config.harvest.max_workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    resolve_input_files(&mut config)?;

    validate(&config)?;

    Ok(config)
}

/// Merges `keywords-file` and `seeds-file` into the inline lists
fn resolve_input_files(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(file) = config.search.keywords_file.take() {
        let lines = read_lines(Path::new(&file))?;
        tracing::debug!("Loaded {} keywords from {}", lines.len(), file);
        merge_unique(&mut config.search.keywords, lines);
    }

    if let Some(file) = config.crawl.seeds_file.take() {
        let lines = read_lines(Path::new(&file))?;
        tracing::debug!("Loaded {} seed URLs from {}", lines.len(), file);
        merge_unique(&mut config.crawl.seeds, lines);
    }

    config.search.keywords = config
        .search
        .keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    Ok(())
}

/// Reads non-empty trimmed lines from a text file
pub fn read_lines(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn merge_unique(target: &mut Vec<String>, extra: Vec<String>) {
    for item in extra {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs sharing a checkpoint can be matched to the
/// configuration that produced them.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
