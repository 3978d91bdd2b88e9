//! File output for aggregated results and reading back record streams

use crate::config::OutputConfig;
use crate::output::aggregate::Aggregate;
use crate::output::record::PageRecord;
use crate::CrawlError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes `value` as indented JSON
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CrawlError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes the consolidated mapping and the error report
pub fn write_aggregate(aggregate: &Aggregate, output: &OutputConfig) -> Result<(), CrawlError> {
    write_json_pretty(Path::new(&output.consolidated_path), &aggregate.consolidated)?;
    write_json_pretty(Path::new(&output.errors_path), &aggregate.errors)?;

    tracing::info!(
        "Wrote {} pages across {} domains to {}, {} errors to {}",
        aggregate.page_count(),
        aggregate.consolidated.len(),
        output.consolidated_path,
        aggregate.errors.len(),
        output.errors_path
    );
    Ok(())
}

/// Reads a JSON Lines record stream; blank lines are ignored
pub fn read_records(path: &Path) -> Result<Vec<PageRecord>, CrawlError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| CrawlError::RecordLine {
            path: path.display().to_string(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}
