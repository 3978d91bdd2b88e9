//! Trust-Crawler: a budget-bounded, domain-scoped site crawler
//!
//! Given one seed URL per organization ("trust"), this crate crawls each site
//! concurrently, fetching at most a fixed number of same-domain pages, and
//! consolidates the resulting page records into a per-domain path → body mapping
//! with a separate error report.

pub mod config;
pub mod crawler;
pub mod output;
pub mod seed;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Trust-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Seed list error: {0}")]
    Seed(#[from] SeedError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("Record sink closed before the crawl finished")]
    SinkClosed,

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Records file {path}, line {line}: {source}")]
    RecordLine {
        path: String,
        line: usize,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for environment override {key}: {value:?}")]
    InvalidOverride { key: String, value: String },
}

/// Seed-list errors
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed list: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: expected 2 fields (name, url), got {found}")]
    FieldCount { row: usize, found: usize },

    #[error("Row {row}: organization name is empty")]
    EmptyName { row: usize },

    #[error("Row {row}: invalid seed URL {url:?}: {reason}")]
    InvalidUrl {
        row: usize,
        url: String,
        reason: String,
    },

    #[error("Row {row}: duplicate organization name {name:?}")]
    DuplicateName { row: usize, name: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Trust-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlOutcome};
pub use output::{aggregate, Aggregate, PageRecord};
pub use seed::SeedEntry;
pub use state::{DomainPhase, Frontier, PageState};
pub use url::{domain_key, normalize_path};
