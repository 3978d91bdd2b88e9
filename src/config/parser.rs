use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

pub const ENV_PAGE_LIMIT: &str = "TRUST_CRAWLER_PAGE_LIMIT";
pub const ENV_FETCH_TIMEOUT_MS: &str = "TRUST_CRAWLER_FETCH_TIMEOUT_MS";
pub const ENV_BACKOFF_MS: &str = "TRUST_CRAWLER_BACKOFF_MS";
pub const ENV_MAX_FETCH_ATTEMPTS: &str = "TRUST_CRAWLER_MAX_FETCH_ATTEMPTS";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides (`TRUST_CRAWLER_*`) are applied after parsing and
/// before validation, so an override can never smuggle in an invalid value.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, override or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    apply_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate(&config)?;

    Ok(config)
}

/// Applies `TRUST_CRAWLER_*` overrides using the given lookup
///
/// The lookup is injected so callers (and tests) decide where values come from;
/// `load_config` passes the process environment.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = parse_override(&lookup, ENV_PAGE_LIMIT)? {
        config.crawler.page_limit = v;
    }
    if let Some(v) = parse_override(&lookup, ENV_FETCH_TIMEOUT_MS)? {
        config.crawler.fetch_timeout_ms = v;
    }
    if let Some(v) = parse_override(&lookup, ENV_BACKOFF_MS)? {
        config.crawler.backoff_ms = v;
    }
    if let Some(v) = parse_override(&lookup, ENV_MAX_FETCH_ATTEMPTS)? {
        config.crawler.max_fetch_attempts = v;
    }
    Ok(())
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidOverride {
                key: key.to_string(),
                value: raw,
            }),
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run's output can be tied back to the exact config.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
