//! Statistics for a finished run
//!
//! This module summarises domain reports and the aggregate into the
//! figures printed at the end of a run.

use crate::crawler::DomainReport;
use crate::output::aggregate::Aggregate;
use crate::output::record::PageRecord;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Domains that ran a crawl (0 when re-aggregating a records file)
    pub domains_crawled: usize,

    /// Domains with at least one page in the consolidated output
    pub domains_with_pages: usize,

    /// Total pages in the consolidated output
    pub pages: usize,

    /// Failure records per reason kind
    pub failures_by_kind: BTreeMap<&'static str, usize>,

    /// Domains below the page limit
    pub under_budget: usize,

    /// Domains whose root redirected to another host
    pub redirected_domains: Vec<String>,

    /// Domains cut off by the domain deadline
    pub deadline_domains: Vec<String>,

    /// Non-HTML pages and redirect duplicates skipped without a record
    pub skipped: u64,
}

impl CrawlStatistics {
    /// Builds statistics from a run's reports, records and aggregate
    pub fn from_run(reports: &[DomainReport], records: &[PageRecord], aggregate: &Aggregate) -> Self {
        let mut failures_by_kind = BTreeMap::new();
        for record in records {
            if let PageRecord::Failure { reason, .. } = record {
                *failures_by_kind.entry(reason.kind()).or_insert(0) += 1;
            }
        }

        Self {
            domains_crawled: reports.len(),
            domains_with_pages: aggregate.consolidated.len(),
            pages: aggregate.page_count(),
            failures_by_kind,
            under_budget: aggregate.under_budget.len(),
            redirected_domains: reports
                .iter()
                .filter_map(|r| {
                    r.redirected_from
                        .as_ref()
                        .map(|from| format!("{} -> {}", from, r.domain))
                })
                .collect(),
            deadline_domains: reports
                .iter()
                .filter(|r| r.deadline_hit)
                .map(|r| r.domain.clone())
                .collect(),
            skipped: reports.iter().map(|r| u64::from(r.skipped)).sum(),
        }
    }

    pub fn total_failures(&self) -> usize {
        self.failures_by_kind.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    if stats.domains_crawled > 0 {
        println!("  Domains crawled: {}", stats.domains_crawled);
    }
    println!("  Domains with pages: {}", stats.domains_with_pages);
    println!("  Pages collected: {}", stats.pages);
    println!("  Pages skipped (non-HTML): {}", stats.skipped);
    println!("  Under-budget domains: {}", stats.under_budget);
    println!();

    if !stats.failures_by_kind.is_empty() {
        println!("Failures ({}):", stats.total_failures());
        let mut kind_counts: Vec<_> = stats.failures_by_kind.iter().collect();
        kind_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in kind_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    if !stats.redirected_domains.is_empty() {
        println!("Redirected Domains ({}):", stats.redirected_domains.len());
        for redirect in &stats.redirected_domains {
            println!("  - {}", redirect);
        }
        println!();
    }

    if !stats.deadline_domains.is_empty() {
        println!("Deadline Reached ({}):", stats.deadline_domains.len());
        for domain in &stats.deadline_domains {
            println!("  - {}", domain);
        }
        println!();
    }

    let attempted = stats.pages + stats.total_failures();
    let success_rate = if attempted > 0 {
        (stats.pages as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} recorded pages)",
        success_rate, stats.pages, attempted
    );
}
