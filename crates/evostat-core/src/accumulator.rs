//! Per-epoch statistic sums.
//!
//! The accumulator mixes two lifetimes on purpose:
//!
//! | Field | Reset at epoch close |
//! |-------|----------------------|
//! | alive count, energy sum, children sum | yes |
//! | lifetime sum, lifetime sample count | never (run-long average) |
//! | plant count | never (running total of reported deltas) |
//!
//! Every average guards its denominator with `max(denominator, 1)`, so an
//! extinct epoch reports an average energy of 0 rather than NaN.

use evostat_types::StatisticsRecord;
use serde::Deserialize;

/// Initial value of the lifespan sample counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifespanBaseline {
    /// Start counting at 1, the legacy behavior. The first
    /// averages are biased low (one phantom zero-length life).
    #[default]
    SeededWithOne,
    /// Start counting at 0 and divide by `max(samples, 1)`.
    Exact,
}

impl LifespanBaseline {
    /// The sample count before any death is recorded.
    pub const fn initial_samples(self) -> u64 {
        match self {
            Self::SeededWithOne => 1,
            Self::Exact => 0,
        }
    }
}

/// Running sums for the current epoch and the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochAccumulator {
    alive_count: u64,
    energy_sum: f64,
    children_sum: u64,
    lifetime_sum: u64,
    lifetime_samples: u64,
    plant_count: i64,
}

impl Default for EpochAccumulator {
    fn default() -> Self {
        Self::new(LifespanBaseline::default())
    }
}

impl EpochAccumulator {
    /// Create an empty accumulator.
    pub const fn new(baseline: LifespanBaseline) -> Self {
        Self {
            alive_count: 0,
            energy_sum: 0.0,
            children_sum: 0,
            lifetime_sum: 0,
            lifetime_samples: baseline.initial_samples(),
            plant_count: 0,
        }
    }

    /// Record one animal alive during the current epoch.
    pub fn record_alive(&mut self, energy: f64, children: u32) {
        self.alive_count = self.alive_count.saturating_add(1);
        self.energy_sum += energy;
        self.children_sum = self.children_sum.saturating_add(u64::from(children));
    }

    /// Record a death at `age` epochs. Feeds the run-long lifespan average.
    pub const fn record_death(&mut self, age: u64) {
        self.lifetime_sum = self.lifetime_sum.saturating_add(age);
        self.lifetime_samples = self.lifetime_samples.saturating_add(1);
    }

    /// Add a (possibly negative) change to the running plant count.
    pub const fn record_plant_delta(&mut self, delta: i64) {
        self.plant_count = self.plant_count.saturating_add(delta);
    }

    /// Compute the statistics for the current sums without resetting.
    #[allow(clippy::cast_precision_loss)]
    pub fn current(&self) -> StatisticsRecord {
        StatisticsRecord {
            alive_count: self.alive_count,
            plant_count: self.plant_count,
            average_energy: self.energy_sum / self.alive_count.max(1) as f64,
            average_lifespan: self.lifetime_sum as f64 / self.lifetime_samples.max(1) as f64,
            children_count: self.children_sum,
        }
    }

    /// Snapshot the current statistics, then reset the per-epoch sums.
    pub fn finalize_epoch(&mut self) -> StatisticsRecord {
        let record = self.current();
        self.alive_count = 0;
        self.energy_sum = 0.0;
        self.children_sum = 0;
        record
    }

    /// Animals recorded alive this epoch.
    pub const fn alive_count(&self) -> u64 {
        self.alive_count
    }

    /// Energy summed over animals alive this epoch.
    pub const fn energy_sum(&self) -> f64 {
        self.energy_sum
    }

    /// Children summed over animals alive this epoch.
    pub const fn children_sum(&self) -> u64 {
        self.children_sum
    }

    /// Ages at death summed over the whole run.
    pub const fn lifetime_sum(&self) -> u64 {
        self.lifetime_sum
    }

    /// Lifespan sample counter (includes the baseline).
    pub const fn lifetime_samples(&self) -> u64 {
        self.lifetime_samples
    }

    /// Running plant count.
    pub const fn plant_count(&self) -> i64 {
        self.plant_count
    }
}
