//! Seams to the external collaborators.
//!
//! - [`StatisticsSink`] receives one [`EpochSnapshot`] per closed epoch and
//!   every [`DominantGenotypeNotice`]. Implementations must not block; the
//!   observer crate's channel sink hands messages to a render task.
//! - [`HistoryWriter`] persists an export dataset. The engine computes the
//!   dataset fully in memory before calling it.

use evostat_types::{DominantGenotypeNotice, EpochSnapshot, HistoryRow};

/// Consumer of per-epoch snapshots and dominant-genotype notices.
///
/// Snapshots arrive in strictly increasing epoch order.
pub trait StatisticsSink: Send {
    /// Called once per closed epoch.
    fn on_epoch(&mut self, snapshot: &EpochSnapshot);

    /// Called when the dominant genotype may have changed.
    fn on_dominant_genotype(&mut self, notice: &DominantGenotypeNotice);
}

impl<T: StatisticsSink + ?Sized> StatisticsSink for Box<T> {
    fn on_epoch(&mut self, snapshot: &EpochSnapshot) {
        (**self).on_epoch(snapshot);
    }

    fn on_dominant_genotype(&mut self, notice: &DominantGenotypeNotice) {
        (**self).on_dominant_genotype(notice);
    }
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl StatisticsSink for NoOpSink {
    fn on_epoch(&mut self, _snapshot: &EpochSnapshot) {}

    fn on_dominant_genotype(&mut self, _notice: &DominantGenotypeNotice) {}
}

/// A sink that keeps everything it receives in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Snapshots in delivery order.
    pub epochs: Vec<EpochSnapshot>,
    /// Notices in delivery order.
    pub notices: Vec<DominantGenotypeNotice>,
}

impl StatisticsSink for MemorySink {
    fn on_epoch(&mut self, snapshot: &EpochSnapshot) {
        self.epochs.push(*snapshot);
    }

    fn on_dominant_genotype(&mut self, notice: &DominantGenotypeNotice) {
        self.notices.push(notice.clone());
    }
}

/// Failure reported by a [`HistoryWriter`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("history writer failed: {message}")]
pub struct WriterError {
    /// Description of the failure.
    pub message: String,
}

impl WriterError {
    /// Wrap any displayable error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Persists an export dataset.
pub trait HistoryWriter {
    /// Write every row, replacing any earlier export.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError`] if the rows could not be persisted.
    fn write_history(&mut self, rows: &[HistoryRow]) -> Result<(), WriterError>;
}

/// A writer that keeps the last written dataset in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    /// Rows of the most recent export.
    pub rows: Vec<HistoryRow>,
    /// Number of exports written so far.
    pub writes: usize,
}

impl HistoryWriter for MemoryWriter {
    fn write_history(&mut self, rows: &[HistoryRow]) -> Result<(), WriterError> {
        self.rows = rows.to_vec();
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }
}
