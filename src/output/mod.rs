//! Output module for crawl records and their consolidation
//!
//! This module handles:
//! - The page record model and its JSON Lines wire format
//! - The single-writer record sink fed by every crawl task
//! - Aggregating the record stream into consolidated and error outputs
//! - Recording crawl statistics

mod aggregate;
mod record;
mod sink;
pub mod stats;
mod writer;

pub use aggregate::{aggregate, Aggregate, Consolidated, ErrorEntry, UnderBudget};
pub use record::{FailureReason, PageRecord};
pub use sink::{spawn_sink, RecordSink, SinkHandle};
pub use stats::{print_statistics, CrawlStatistics};
pub use writer::{read_records, write_aggregate, write_json_pretty};

use crate::config::Config;
use crate::Result;
use std::path::Path;

/// Re-aggregates an existing records file and rewrites the outputs
///
/// # Returns
///
/// * `Ok((records, aggregate))` - The records read back and what was written
/// * `Err(CrawlError)` - The records file was missing or malformed, or an output failed
pub fn reaggregate(config: &Config) -> Result<(Vec<PageRecord>, Aggregate)> {
    let path = Path::new(&config.output.records_path);
    tracing::info!("Reading records from {}", path.display());

    let records = read_records(path)?;
    let aggregate = aggregate(&records, config.crawler.page_limit);
    write_aggregate(&aggregate, &config.output)?;

    Ok((records, aggregate))
}
