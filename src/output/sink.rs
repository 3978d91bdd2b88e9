//! Append-only record sink
//!
//! Every crawl task holds a cloned [`RecordSink`]; a single writer task owns
//! the receiving end, appends each record to the records file as a JSON line
//! and keeps the full stream for aggregation.

use crate::output::record::PageRecord;
use crate::CrawlError;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending half of the record stream
#[derive(Debug, Clone)]
pub struct RecordSink {
    tx: mpsc::UnboundedSender<PageRecord>,
}

impl RecordSink {
    pub fn emit(&self, record: PageRecord) -> Result<(), CrawlError> {
        self.tx.send(record).map_err(|_| CrawlError::SinkClosed)
    }
}

/// Writer side; resolves once every [`RecordSink`] clone is dropped
#[derive(Debug)]
pub struct SinkHandle {
    handle: JoinHandle<Result<Vec<PageRecord>, CrawlError>>,
}

impl SinkHandle {
    /// Waits for the writer to drain and returns the complete stream
    pub async fn finish(self) -> Result<Vec<PageRecord>, CrawlError> {
        self.handle.await?
    }
}

/// Starts the writer task
///
/// With `path` set, records are streamed to that file (truncated first) as
/// JSON Lines; without it they are only collected in memory. The file is
/// created before the task starts, so an unusable path fails here.
pub async fn spawn_sink(path: Option<&Path>) -> Result<(RecordSink, SinkHandle), CrawlError> {
    let writer = match path {
        Some(path) => Some(BufWriter::new(File::create(path).await?)),
        None => None,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(write_records(rx, writer));
    Ok((RecordSink { tx }, SinkHandle { handle }))
}

async fn write_records(
    mut rx: mpsc::UnboundedReceiver<PageRecord>,
    mut writer: Option<BufWriter<File>>,
) -> Result<Vec<PageRecord>, CrawlError> {
    let mut records = Vec::new();

    while let Some(record) = rx.recv().await {
        if let Some(writer) = writer.as_mut() {
            let mut line = serde_json::to_vec(&record)?;
            line.push(b'\n');
            writer.write_all(&line).await?;
        }
        records.push(record);
    }

    if let Some(mut writer) = writer {
        writer.flush().await?;
    }

    tracing::debug!("Record sink closed after {} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::record::FailureReason;

    #[tokio::test]
    async fn test_collects_from_many_senders() {
        let (sink, handle) = spawn_sink(None).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..8 {
            let sink = sink.clone();
            tasks.push(tokio::spawn(async move {
                sink.emit(PageRecord::success("a.org", format!("/p{}", i), "b"))
            }));
        }
        drop(sink);
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let records = handle.finish().await.unwrap();
        assert_eq!(records.len(), 8);
    }

    #[tokio::test]
    async fn test_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");

        let (sink, handle) = spawn_sink(Some(path.as_path())).await.unwrap();
        sink.emit(PageRecord::success("a.org", "/", "<p>hi</p>")).unwrap();
        sink.emit(PageRecord::failure("a.org", "/x", FailureReason::Status(404)))
            .unwrap();
        drop(sink);
        handle.finish().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], r#"{"domain":"a.org","path":"/x","status":404}"#);
    }

    #[tokio::test]
    async fn test_unwritable_path_fails_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("records.jsonl");

        match spawn_sink(Some(path.as_path())).await {
            Err(CrawlError::Io(_)) => {}
            other => panic!("expected Io error, got {:?}", other.map(|_| ())),
        }
    }
}
