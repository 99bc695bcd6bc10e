//! CSV report of every file moved during a run.

use chrono::{DateTime, SecondsFormat, Utc};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Column names of the report, in order.
pub const REPORT_HEADER: [&str; 4] = ["timestamp", "src", "dst", "size_bytes"];

/// Errors that can occur while persisting the report.
#[derive(Debug, Error)]
pub enum ReportWriteError {
    /// Creating, syncing or renaming the report file failed.
    #[error("Failed to write report {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializing a row failed.
    #[error("Failed to write report {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// When the file was processed.
    pub timestamp: DateTime<Utc>,
    /// Absolute path before the move.
    pub source_path: PathBuf,
    /// Absolute path after the move, or the would-be path under dry-run.
    pub destination_path: PathBuf,
    /// Size of the moved file, 0 if it could not be read.
    pub size_bytes: u64,
}

impl MoveRecord {
    /// Creates a record stamped with the current time.
    pub fn new(source_path: PathBuf, destination_path: PathBuf, size_bytes: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            source_path,
            destination_path,
            size_bytes,
        }
    }

    fn to_row(&self) -> [String; 4] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.source_path.to_string_lossy().into_owned(),
            self.destination_path.to_string_lossy().into_owned(),
            self.size_bytes.to_string(),
        ]
    }
}

/// Records of one run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    records: Vec<MoveRecord>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn record(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<MoveRecord> {
        self.records
    }

    /// Writes the header and every record to `path`.
    ///
    /// The CSV is written to a temporary file next to `path` and renamed over
    /// it only once complete, so a failure never leaves a truncated report or
    /// clobbers an earlier one.
    pub fn flush(&self, path: &Path) -> Result<(), ReportWriteError> {
        let io_err = |source: io::Error| ReportWriteError::Io {
            path: path.to_path_buf(),
            source,
        };
        let csv_err = |source: csv::Error| ReportWriteError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp = NamedTempFile::new_in(dir).map_err(io_err)?;
        let mut writer = csv::Writer::from_writer(temp);

        writer.write_record(REPORT_HEADER).map_err(csv_err)?;
        for record in &self.records {
            writer.write_record(record.to_row()).map_err(csv_err)?;
        }

        let mut temp = writer
            .into_inner()
            .map_err(|e| io_err(io::Error::new(e.error().kind(), e.error().to_string())))?;
        temp.flush().map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(path).map_err(|e| io_err(e.error))?;

        tracing::info!(path = %path.display(), rows = self.records.len(), "report written");
        Ok(())
    }
}
