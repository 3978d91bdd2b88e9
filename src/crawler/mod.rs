//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - Per-domain crawl coordination
//! - Running all domains under a global concurrency cap

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{DomainCrawler, DomainReport, DEADLINE_EXCEEDED};
pub use fetcher::{build_http_client, fetch_once, fetch_with_retry, FetchOutcome, RetryPolicy};
pub use parser::extract_links;
pub use scheduler::{dedup_seeds, Scheduler};

use crate::config::Config;
use crate::output::{aggregate, spawn_sink, write_aggregate, Aggregate, PageRecord};
use crate::seed::{load_seeds, SeedEntry};
use crate::Result;
use std::path::Path;

/// Everything a crawl run produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// The full record stream, in arrival order
    pub records: Vec<PageRecord>,
    /// One report per crawled domain, sorted by trust name
    pub reports: Vec<DomainReport>,
}

/// Crawls every seed and streams records to the configured records file
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seeds` - Organizations to crawl; seeds sharing a domain key are crawled once
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - All domains finished (individual page failures are records)
/// * `Err(CrawlError)` - The HTTP client or the records file could not be set up
pub async fn crawl(config: &Config, seeds: Vec<SeedEntry>) -> Result<CrawlOutcome> {
    let client = build_http_client(&config.user_agent, &config.crawler)?;
    let (sink, handle) = spawn_sink(Some(Path::new(&config.output.records_path))).await?;

    tracing::info!(
        "Crawling {} seeds, {} pages per domain, {} domains at a time",
        seeds.len(),
        config.crawler.page_limit,
        config.crawler.max_concurrent_domains
    );

    let scheduler = Scheduler::new(config.crawler.clone(), client);
    let reports = scheduler.run(seeds, sink).await;
    let records = handle.finish().await?;

    tracing::info!(
        "Crawl finished: {} records ({} pages) from {} domains written to {}",
        records.len(),
        records.iter().filter(|r| r.is_success()).count(),
        reports.len(),
        config.output.records_path
    );

    Ok(CrawlOutcome { records, reports })
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a run. It will:
/// 1. Load the seed list
/// 2. Crawl every domain, writing the record stream
/// 3. Aggregate the records
/// 4. Write the consolidated mapping and the error report
pub async fn run_pipeline(config: &Config) -> Result<(CrawlOutcome, Aggregate)> {
    let seeds = load_seeds(Path::new(&config.input.seeds_path))?;
    tracing::info!("Loaded {} seeds from {}", seeds.len(), config.input.seeds_path);

    let outcome = crawl(config, seeds).await?;
    let aggregate = aggregate(&outcome.records, config.crawler.page_limit);
    write_aggregate(&aggregate, &config.output)?;

    Ok((outcome, aggregate))
}
