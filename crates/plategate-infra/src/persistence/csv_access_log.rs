//! Access log appended to a CSV file

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use plategate_domain::repository::AccessLogSink;
use plategate_types::{AccessAttempt, Error, Result};

/// CSV implementation of AccessLogSink.
///
/// Columns: timestamp, plate_number, detected_color, detected_model,
/// plate_matched, color_matched. The header is written when the file is
/// created.
#[derive(Debug)]
pub struct CsvAccessLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvAccessLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AccessLogSink for CsvAccessLog {
    fn record(&self, attempt: &AccessAttempt) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::InvalidInput("access log lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(needs_header).from_writer(file);
        writer.serialize(attempt)?;
        writer.flush()?;

        debug!(plate = %attempt.plate_number, granted = attempt.plate_matched, "access attempt logged");
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AccessAttempt>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new().from_path(&self.path)?;
        let mut attempts = reader
            .deserialize()
            .collect::<std::result::Result<Vec<AccessAttempt>, csv::Error>>()?;

        let skip = attempts.len().saturating_sub(limit);
        Ok(attempts.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plategate_types::{AccessDecision, AttemptFilter};

    fn attempt(plate: &str, granted: bool) -> AccessAttempt {
        let mut decision = AccessDecision::not_registered();
        decision.granted = granted;
        AccessAttempt::from_decision(plate, "Red", "Toyota", &decision)
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvAccessLog::new(dir.path().join("access_log.csv"));
        log.record(&attempt("AAA111", true)).unwrap();
        log.record(&attempt("BBB222", false)).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,plate_number,detected_color,detected_model,plate_matched,color_matched"
        );
        assert!(lines[1].contains("AAA111"));
    }

    #[test]
    fn test_recent_returns_newest_last() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvAccessLog::new(dir.path().join("logs").join("access_log.csv"));
        for plate in ["AAA111", "BBB222", "CCC333"] {
            log.record(&attempt(plate, false)).unwrap();
        }

        let recent = log.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].plate_number, "BBB222");
        assert_eq!(recent[1].plate_number, "CCC333");
        assert!(recent[1].color_matched);
    }

    #[test]
    fn test_recent_matching_filters_before_limit() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvAccessLog::new(dir.path().join("access_log.csv"));
        for (plate, granted) in [("AAA111", false), ("BBB222", true), ("CCC333", false), ("DDD444", true)] {
            log.record(&attempt(plate, granted)).unwrap();
        }

        let denied = log.recent_matching(10, AttemptFilter::Denied).unwrap();
        let plates: Vec<_> = denied.iter().map(|a| a.plate_number.as_str()).collect();
        assert_eq!(plates, vec!["AAA111", "CCC333"]);

        let granted = log.recent_matching(1, AttemptFilter::Granted).unwrap();
        assert_eq!(granted.len(), 1);
        assert_eq!(granted[0].plate_number, "DDD444");

        assert_eq!(log.recent_matching(10, AttemptFilter::All).unwrap().len(), 4);
    }

    #[test]
    fn test_recent_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvAccessLog::new(dir.path().join("none.csv"));
        assert!(log.recent(10).unwrap().is_empty());
    }
}
