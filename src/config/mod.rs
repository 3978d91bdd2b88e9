//! Configuration module for Trust-Crawler
//!
//! This module handles loading, parsing, overriding and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use trust_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Pages per domain: {}", config.crawler.page_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, InputConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    apply_overrides, compute_config_hash, load_config, load_config_with_hash, ENV_BACKOFF_MS,
    ENV_FETCH_TIMEOUT_MS, ENV_MAX_FETCH_ATTEMPTS, ENV_PAGE_LIMIT,
};
pub use validation::validate;
