//! Scheduler for running every seed's crawl
//!
//! This module handles:
//! - Dropping seeds whose domain key was already seen
//! - Global concurrency limiting of domain crawls via a semaphore
//! - Isolating domains: one crawl failing never stops the others

use crate::config::CrawlerConfig;
use crate::crawler::coordinator::{DomainCrawler, DomainReport};
use crate::output::RecordSink;
use crate::seed::SeedEntry;
use crate::url::domain_key;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs domain crawls concurrently, at most `max-concurrent-domains` at a time
pub struct Scheduler {
    /// Global semaphore limiting concurrent domain crawls
    semaphore: Arc<Semaphore>,

    /// HTTP client shared by every domain
    client: Client,

    /// Crawler configuration
    config: CrawlerConfig,
}

impl Scheduler {
    pub fn new(config: CrawlerConfig, client: Client) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_domains.max(1) as usize));

        Self {
            semaphore,
            client,
            config,
        }
    }

    /// Crawls every seed, feeding all records into `sink`
    ///
    /// The sink is dropped once the last domain finishes, which lets its
    /// writer task drain and complete. Reports come back sorted by trust name.
    pub async fn run(&self, seeds: Vec<SeedEntry>, sink: RecordSink) -> Vec<DomainReport> {
        let mut tasks = JoinSet::new();

        for seed in dedup_seeds(seeds) {
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!("Domain semaphore closed: {}", e);
                    break;
                }
            };

            let name = seed.name.clone();
            let crawler =
                match DomainCrawler::new(seed, self.client.clone(), &self.config, sink.clone()) {
                    Ok(crawler) => crawler,
                    Err(e) => {
                        tracing::error!("Cannot crawl {}: {}", name, e);
                        continue;
                    }
                };

            tasks.spawn(async move {
                let _permit = permit;
                (name, crawler.run().await)
            });
        }

        drop(sink);

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(report))) => reports.push(report),
                Ok((name, Err(e))) => tracing::error!("Crawl of {} failed: {}", name, e),
                Err(e) => tracing::error!("Domain crawl task failed: {}", e),
            }
        }

        reports.sort_by(|a, b| a.trust.cmp(&b.trust));
        reports
    }
}

/// Keeps the first seed for each domain key
pub fn dedup_seeds(seeds: Vec<SeedEntry>) -> Vec<SeedEntry> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(seeds.len());

    for seed in seeds {
        let Some(key) = domain_key(&seed.url) else {
            tracing::warn!("Seed {} has no host, skipping {}", seed.name, seed.url);
            continue;
        };

        if seen.insert(key.clone()) {
            kept.push(seed);
        } else {
            tracing::warn!(
                "Seed {} shares domain {} with an earlier seed, skipping",
                seed.name,
                key
            );
        }
    }

    kept
}
