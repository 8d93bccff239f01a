//! Core data structs exchanged between the simulation loop, the
//! statistics engine, and the external collaborators.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DominanceCause;
use crate::genome::Genome;
use crate::ids::AnimalId;

/// Number of columns in every statistics row.
pub const COLUMN_COUNT: usize = 5;

/// Literal header row of the exported history.
pub const HISTORY_HEADER: [&str; COLUMN_COUNT] = [
    "Animals No.",
    "Number of plants",
    "Average Energy",
    "Average Lifespan",
    "Number Of Children",
];

/// Marker written in every column of the row preceding the averages.
pub const AVERAGE_MARKER: &str = "Average:";

// ---------------------------------------------------------------------------
// Simulation input
// ---------------------------------------------------------------------------

/// The view of an animal the statistics engine needs.
///
/// The simulation owns its animals; it passes this projection with each
/// birth, alive, and death event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    /// Unique animal identifier.
    pub id: AnimalId,
    /// The animal's genome (never mutated after birth).
    pub genome: Genome,
    /// Epoch in which the animal was born.
    pub birth_epoch: u64,
    /// Current energy.
    pub energy: f64,
    /// Number of children this animal has produced so far.
    pub children: u32,
}

impl Animal {
    /// Create a freshly born animal with no children.
    pub fn new(genome: Genome, birth_epoch: u64, energy: f64) -> Self {
        Self {
            id: AnimalId::new(),
            genome,
            birth_epoch,
            energy,
            children: 0,
        }
    }

    /// Age of the animal at `epoch`, or `None` if `epoch` precedes its birth.
    pub const fn age_at(&self, epoch: u64) -> Option<u64> {
        epoch.checked_sub(self.birth_epoch)
    }
}

// ---------------------------------------------------------------------------
// Per-epoch statistics
// ---------------------------------------------------------------------------

/// The five statistics computed for one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatisticsRecord {
    /// Number of animals reported alive during the epoch.
    pub alive_count: u64,
    /// Running plant count at the end of the epoch.
    pub plant_count: i64,
    /// Energy sum divided by `max(alive_count, 1)`.
    pub average_energy: f64,
    /// Run-long average age at death.
    pub average_lifespan: f64,
    /// Sum of the children counts of every animal alive this epoch.
    pub children_count: u64,
}

impl StatisticsRecord {
    /// Return the record as numeric columns in export order.
    #[allow(clippy::cast_precision_loss)]
    pub fn columns(&self) -> [f64; COLUMN_COUNT] {
        [
            self.alive_count as f64,
            self.plant_count as f64,
            self.average_energy,
            self.average_lifespan,
            self.children_count as f64,
        ]
    }

    /// Render the record as an export row.
    pub fn to_row(&self) -> HistoryRow {
        HistoryRow::from_values(self.columns())
    }
}

/// A finalized epoch: its index plus its statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// Epoch index.
    pub epoch: u64,
    /// Statistics for the epoch.
    pub stats: StatisticsRecord,
}

/// The per-epoch tuple handed to chart renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EpochSnapshot {
    /// Epoch index (x axis of every chart).
    pub epoch: u64,
    /// Number of animals alive.
    pub alive_count: f64,
    /// Number of plants.
    pub plant_count: f64,
    /// Average energy of living animals.
    pub average_energy: f64,
    /// Run-long average lifespan.
    pub average_lifespan: f64,
    /// Number of children of living animals.
    pub children_count: f64,
}

impl From<&EpochRecord> for EpochSnapshot {
    fn from(record: &EpochRecord) -> Self {
        let [alive_count, plant_count, average_energy, average_lifespan, children_count] =
            record.stats.columns();
        Self {
            epoch: record.epoch,
            alive_count,
            plant_count,
            average_energy,
            average_lifespan,
            children_count,
        }
    }
}

/// Notification that the dominant genotype may have changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DominantGenotypeNotice {
    /// Epoch of the triggering event, when known (deaths carry one).
    pub epoch: Option<u64>,
    /// Display string of the current dominant genotype.
    pub genotype: String,
    /// Live count of the dominant genotype.
    pub count: u32,
    /// The event that triggered the notification.
    pub cause: DominanceCause,
}

// ---------------------------------------------------------------------------
// Export rows
// ---------------------------------------------------------------------------

/// One exported row: five string columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRow {
    columns: [String; COLUMN_COUNT],
}

impl HistoryRow {
    /// The literal header row.
    pub fn header() -> Self {
        Self {
            columns: HISTORY_HEADER.map(str::to_owned),
        }
    }

    /// The row of [`AVERAGE_MARKER`] cells preceding the averages.
    pub fn average_marker() -> Self {
        Self {
            columns: [AVERAGE_MARKER; COLUMN_COUNT].map(str::to_owned),
        }
    }

    /// Render numeric values with [`format_cell`].
    pub fn from_values(values: [f64; COLUMN_COUNT]) -> Self {
        Self {
            columns: values.map(format_cell),
        }
    }

    /// Return the cells in column order.
    pub fn columns(&self) -> &[String; COLUMN_COUNT] {
        &self.columns
    }

    /// Whether this row is the average marker row.
    pub fn is_average_marker(&self) -> bool {
        self.columns.iter().all(|c| c == AVERAGE_MARKER)
    }
}

/// Format a statistic for export.
///
/// Integral values keep one decimal place (`3.0`); everything else uses
/// the shortest representation that round-trips (`2.5`, `0.1`).
#[allow(clippy::float_cmp)]
pub fn format_cell(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
