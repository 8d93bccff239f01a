//! Append-only history of epoch statistics.
//!
//! The exported dataset is laid out as:
//!
//! ```text
//! header row            "Animals No.;Number of plants;..."
//! one row per epoch     "12.0;40.0;17.5;3.2;4.0"
//! average marker row    "Average:;Average:;..."      (after an export)
//! column averages       "10.5;38.0;16.1;3.0;3.5"     (after an export)
//! ```
//!
//! The average block is held as an `Option` next to the epoch records
//! rather than as rows inside the log, so at most one block can exist.
//! Exporting replaces it and appending a new epoch drops it (it would be
//! stale). The header and the block never contribute to the sums.

use evostat_types::{COLUMN_COUNT, EpochRecord, HistoryRow};
use serde::Deserialize;
use tracing::debug;

/// Errors that can occur when exporting the history.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// Export was requested before any epoch was closed.
    #[error("cannot export averages: no epoch has been recorded yet")]
    EmptyHistory,
}

/// Divisor applied to the column sums of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageDivisor {
    /// Divide by the number of epoch rows.
    #[default]
    EpochRows,
    /// Divide by the epoch rows plus the header row. Matches files written
    /// by earlier statistics exports.
    IncludeHeader,
}

impl AverageDivisor {
    /// Divisor for a log holding `epoch_rows` epoch records.
    pub const fn divisor(self, epoch_rows: usize) -> usize {
        match self {
            Self::EpochRows => {
                if epoch_rows == 0 {
                    1
                } else {
                    epoch_rows
                }
            }
            Self::IncludeHeader => epoch_rows.saturating_add(1),
        }
    }
}

/// Ordered epoch records plus at most one trailing average block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    records: Vec<EpochRecord>,
    averages: Option<[f64; COLUMN_COUNT]>,
    divisor: AverageDivisor,
}

impl HistoryLog {
    /// Create an empty log using the given average divisor.
    pub const fn new(divisor: AverageDivisor) -> Self {
        Self {
            records: Vec::new(),
            averages: None,
            divisor,
        }
    }

    /// Append a finalized epoch. Drops a stale average block.
    pub fn append(&mut self, record: EpochRecord) {
        if self.averages.take().is_some() {
            debug!(epoch = record.epoch, "Dropping stale average block");
        }
        self.records.push(record);
    }

    /// Compute the column averages, replace the average block, and return
    /// the full export dataset.
    ///
    /// The dataset is built entirely in memory; handing it to a writer
    /// cannot affect the log.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::EmptyHistory`] if no epoch was recorded.
    #[allow(clippy::cast_precision_loss)]
    pub fn export_with_averages(&mut self) -> Result<Vec<HistoryRow>, HistoryError> {
        if self.records.is_empty() {
            return Err(HistoryError::EmptyHistory);
        }

        let mut sums = [0.0_f64; COLUMN_COUNT];
        for record in &self.records {
            for (sum, value) in sums.iter_mut().zip(record.stats.columns()) {
                *sum += value;
            }
        }

        let divisor = self.divisor.divisor(self.records.len()) as f64;
        let averages = sums.map(|sum| sum / divisor);
        self.averages = Some(averages);

        debug!(
            epochs = self.records.len(),
            divisor,
            "History averages recomputed"
        );
        Ok(self.rows())
    }

    /// Render the log as rows without recomputing anything.
    pub fn rows(&self) -> Vec<HistoryRow> {
        let extra = if self.averages.is_some() { 3 } else { 1 };
        let mut rows = Vec::with_capacity(self.records.len().saturating_add(extra));
        rows.push(HistoryRow::header());
        rows.extend(self.records.iter().map(|r| r.stats.to_row()));
        if let Some(averages) = self.averages {
            rows.push(HistoryRow::average_marker());
            rows.push(HistoryRow::from_values(averages));
        }
        rows
    }

    /// The current average block, if an export happened since the last append.
    pub const fn averages(&self) -> Option<[f64; COLUMN_COUNT]> {
        self.averages
    }

    /// Every epoch record in order.
    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    /// The most recent epoch record.
    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    /// Number of epoch records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no epoch was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The divisor policy in use.
    pub const fn divisor(&self) -> AverageDivisor {
        self.divisor
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use evostat_types::StatisticsRecord;

    use super::*;

    fn record(epoch: u64, alive: u64, plants: i64, energy: f64) -> EpochRecord {
        EpochRecord {
            epoch,
            stats: StatisticsRecord {
                alive_count: alive,
                plant_count: plants,
                average_energy: energy,
                average_lifespan: 2.0,
                children_count: alive,
            },
        }
    }

    fn cells(row: &HistoryRow) -> Vec<&str> {
        row.columns().iter().map(String::as_str).collect()
    }

    #[test]
    fn empty_export_is_rejected() {
        let mut log = HistoryLog::default();
        assert_eq!(log.export_with_averages(), Err(HistoryError::EmptyHistory));
        assert_eq!(log.rows(), vec![HistoryRow::header()]);
    }

    #[test]
    fn export_appends_marker_and_averages() {
        let mut log = HistoryLog::default();
        log.append(record(1, 10, 4, 3.0));
        log.append(record(2, 20, 8, 5.0));

        let rows = log.export_with_averages().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], HistoryRow::header());
        assert_eq!(cells(&rows[1]), vec!["10.0", "4.0", "3.0", "2.0", "10.0"]);
        assert!(rows[3].is_average_marker());
        assert_eq!(cells(&rows[4]), vec!["15.0", "6.0", "4.0", "2.0", "15.0"]);
    }

    #[test]
    fn export_is_idempotent() {
        let mut log = HistoryLog::default();
        log.append(record(1, 3, 1, 1.0 / 3.0));
        log.append(record(2, 7, 2, 0.1));
        log.append(record(3, 5, 3, 0.2));

        let first = log.export_with_averages().unwrap();
        let second = log.export_with_averages().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            second.iter().filter(|r| r.is_average_marker()).count(),
            1
        );
    }

    #[test]
    fn include_header_divisor_reproduces_legacy_averages() {
        let mut log = HistoryLog::new(AverageDivisor::IncludeHeader);
        log.append(record(1, 10, 0, 3.0));
        log.append(record(2, 20, 0, 6.0));
        let rows = log.export_with_averages().unwrap();
        // Sums divided by 3 (two epochs plus header).
        assert_eq!(cells(&rows[4])[0], "10.0");
        assert_eq!(cells(&rows[4])[2], "3.0");
    }

    #[test]
    fn append_after_export_drops_stale_block() {
        let mut log = HistoryLog::default();
        log.append(record(1, 2, 0, 1.0));
        log.export_with_averages().unwrap();
        assert!(log.averages().is_some());

        log.append(record(2, 4, 0, 1.0));
        assert!(log.averages().is_none());
        assert_eq!(log.rows().len(), 3);

        let rows = log.export_with_averages().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(cells(&rows[4])[0], "3.0");
    }

    #[test]
    fn divisor_never_returns_zero() {
        assert_eq!(AverageDivisor::EpochRows.divisor(0), 1);
        assert_eq!(AverageDivisor::EpochRows.divisor(4), 4);
        assert_eq!(AverageDivisor::IncludeHeader.divisor(4), 5);
    }
}
