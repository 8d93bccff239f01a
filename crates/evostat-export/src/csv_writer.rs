//! `;`-separated history files.
//!
//! Every export rewrites the whole file: header, one row per epoch, the
//! `Average:` marker row, and the averages. Cells are written verbatim
//! (no quoting) with `\n` line endings.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use evostat_core::sink::{HistoryWriter, WriterError};
use evostat_types::HistoryRow;
use tracing::info;

use crate::error::ExportError;

/// Column separator of the export format.
pub const DELIMITER: u8 = b';';

/// File name for the export of `run_name` started at `timestamp`:
/// `<run_name>-Stats-<unix seconds>.csv`.
pub fn export_file_name(run_name: &str, timestamp: DateTime<Utc>) -> String {
    format!("{run_name}-Stats-{}.csv", timestamp.timestamp())
}

/// A [`HistoryWriter`] that writes to one CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHistoryWriter {
    path: PathBuf,
}

impl CsvHistoryWriter {
    /// Write to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write to `<dir>/<run_name>-Stats-<unix seconds>.csv`.
    pub fn for_run(dir: &Path, run_name: &str, timestamp: DateTime<Utc>) -> Self {
        Self::new(dir.join(export_file_name(run_name, timestamp)))
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `rows`, replacing the file. Missing parent directories are
    /// created.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the directory or file cannot be written.
    pub fn write_rows(&self, rows: &[HistoryRow]) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_path(&self.path)?;
        for row in rows {
            writer.write_record(row.columns())?;
        }
        writer.flush()?;

        info!(path = %self.path.display(), rows = rows.len(), "History written");
        Ok(())
    }
}

impl HistoryWriter for CsvHistoryWriter {
    fn write_history(&mut self, rows: &[HistoryRow]) -> Result<(), WriterError> {
        self.write_rows(rows)
            .map_err(|e| WriterError::new(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn file_name_uses_unix_seconds() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(export_file_name("meadow", ts), "meadow-Stats-1704164645.csv");
    }

    #[test]
    fn writes_semicolon_rows_without_quotes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let writer = CsvHistoryWriter::new(&path);

        let rows = vec![HistoryRow::header(), HistoryRow::from_values([1.0, 2.0, 2.5, 0.0, 3.0])];
        writer.write_rows(&rows).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Animals No.;Number of plants;Average Energy;Average Lifespan;Number Of Children\n\
             1.0;2.0;2.5;0.0;3.0\n"
        );
    }

    #[test]
    fn rewrite_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let mut writer = CsvHistoryWriter::new(dir.path().join("nested").join("out.csv"));
        let long = vec![HistoryRow::header(), HistoryRow::average_marker()];
        writer.write_history(&long).unwrap();
        writer.write_history(&[HistoryRow::header()]).unwrap();

        let contents = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn unwritable_path_maps_to_writer_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a file.
        let mut writer = CsvHistoryWriter::new(dir.path());
        let err = writer.write_history(&[HistoryRow::header()]).unwrap_err();
        assert!(!err.message.is_empty());
    }
}
