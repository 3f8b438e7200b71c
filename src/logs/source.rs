//! Where a batch comes from. The engine only ever sees the materialized batch.

use super::sample::{default_base, SampleGenerator};
use super::{LogError, LogRecord};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Supplies one finite, fully materialized batch of records.
#[async_trait::async_trait]
pub trait LogSource: Send + Sync {
    /// Short human label for logs ("file:/tmp/x.json", "sample:seed=42").
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Vec<LogRecord>, LogError>;
}

/// A JSON array or JSON-lines file on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl LogSource for FileSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn fetch(&self) -> Result<Vec<LogRecord>, LogError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LogError::Read {
                path: self.path.display().to_string(),
                source,
            })?;
        let records = parse_batch(&content)?;
        info!(path = %self.path.display(), records = records.len(), "loaded log batch");
        Ok(records)
    }
}

/// Generated records, see [`SampleGenerator`].
pub struct SampleSource {
    pub seed: u64,
    pub count: usize,
    /// Newest timestamp in the batch.
    pub base: NaiveDateTime,
}

impl SampleSource {
    pub fn new(seed: u64, count: usize) -> Self {
        Self {
            seed,
            count,
            base: default_base(),
        }
    }
}

#[async_trait::async_trait]
impl LogSource for SampleSource {
    fn describe(&self) -> String {
        format!("sample:seed={}", self.seed)
    }

    async fn fetch(&self) -> Result<Vec<LogRecord>, LogError> {
        let records = SampleGenerator::with_base(self.seed, self.base).generate(self.count);
        debug!(seed = self.seed, records = records.len(), "generated sample batch");
        Ok(records)
    }
}

/// Parse either a JSON array of records or one record per line.
/// Blank lines in JSON-lines input are skipped.
pub fn parse_batch(content: &str) -> Result<Vec<LogRecord>, LogError> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(content).map_err(|source| LogError::Parse {
            line: source.line(),
            source,
        });
    }

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| LogError::Parse {
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::LogLevel;
    use std::io::Write;

    const LINE_A: &str = r#"{"id":"a","timestamp":"2024-01-15 14:32:15","level":"error","service":"auth-service","message":"Failed to authenticate user: invalid token"}"#;
    const LINE_B: &str = r#"{"id":"b","timestamp":"2024-01-15 14:32:12","level":"info","service":"api-gateway","message":"Request processed successfully"}"#;

    #[test]
    fn test_parse_json_lines() {
        let content = format!("{}\n\n{}\n", LINE_A, LINE_B);
        let records = parse_batch(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, LogLevel::Error);
        assert_eq!(records[1].service, "api-gateway");
    }

    #[test]
    fn test_parse_json_array() {
        let content = format!("[{},{}]", LINE_A, LINE_B);
        assert_eq!(parse_batch(&content).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let content = format!("{}\n{}\n", LINE_A, r#"{"id":"c","level":"fatal"}"#);
        match parse_batch(&content) {
            Err(LogError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_array_error_line_counts_leading_blank_lines() {
        let content = format!("\n\n[\n{},\n{}\n]", LINE_A, r#"{"id":"c","level":"fatal"}"#);
        match parse_batch(&content) {
            Err(LogError::Parse { line, .. }) => assert_eq!(line, 5),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_empty_batch() {
        assert!(parse_batch("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_file_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", LINE_A).unwrap();
        writeln!(file, "{}", LINE_B).unwrap();

        let source = FileSource::new(file.path());
        let records = tokio_test::block_on(source.fetch()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(source.describe().starts_with("file:"));
    }

    #[test]
    fn test_file_source_missing_file() {
        let source = FileSource::new("/definitely/not/here.jsonl");
        let err = tokio_test::block_on(source.fetch()).unwrap_err();
        assert!(matches!(err, LogError::Read { .. }));
    }

    #[test]
    fn test_sample_source_count() {
        let source = SampleSource::new(9, 25);
        let records = tokio_test::block_on(source.fetch()).unwrap();
        assert_eq!(records.len(), 25);
        assert_eq!(records, tokio_test::block_on(SampleSource::new(9, 25).fetch()).unwrap());
    }
}
