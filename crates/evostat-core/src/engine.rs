//! The statistics engine: event API, epoch lifecycle, and hand-off.
//!
//! The simulation loop is the single writer. Within an epoch it reports
//! births, living animals, deaths, and plant deltas; at the epoch boundary
//! it calls [`StatisticsEngine::close_epoch`], which:
//!
//! 1. validates the epoch index (strictly increasing),
//! 2. finalizes the accumulator (resetting the per-epoch sums),
//! 3. appends the record to the [`HistoryLog`],
//! 4. hands an [`EpochSnapshot`] to the [`StatisticsSink`].
//!
//! The engine itself never blocks and performs no synchronization; all
//! methods take `&mut self`. Concurrency lives behind the sink.
//!
//! ```text
//! Idle --event--> EpochOpen --close_epoch--> EpochClosed --event--> EpochOpen
//!                                                 |
//!                                               finish
//!                                                 v
//!                                             Finalized (exports only)
//! ```

use evostat_types::{
    Animal, AnimalId, DominanceCause, DominantGenotypeNotice, EnginePhase, EpochRecord,
    EpochSnapshot, Genome, HistoryRow, StatisticsRecord,
};
use tracing::{debug, info, warn};

use crate::accumulator::{EpochAccumulator, LifespanBaseline};
use crate::config::StatsConfig;
use crate::epoch::{EpochError, EpochSequencer};
use crate::genotype::{BirthOutcome, DeathOutcome, DominantGenotype, GenotypeError, GenotypeTracker};
use crate::history::{AverageDivisor, HistoryError, HistoryLog};
use crate::sink::{HistoryWriter, NoOpSink, StatisticsSink, WriterError};

/// Errors surfaced by the engine's event API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A genotype population update failed.
    #[error("genotype error: {source}")]
    Genotype {
        /// The underlying genotype error.
        #[from]
        source: GenotypeError,
    },

    /// The history could not be exported.
    #[error("history error: {source}")]
    History {
        /// The underlying history error.
        #[from]
        source: HistoryError,
    },

    /// An epoch index arrived out of order.
    #[error("epoch error: {source}")]
    Epoch {
        /// The underlying epoch error.
        #[from]
        source: EpochError,
    },

    /// A death was reported before the animal's birth epoch.
    #[error("animal {animal} died at epoch {epoch} before its birth epoch {birth_epoch}")]
    DeathBeforeBirth {
        /// The animal concerned.
        animal: AnimalId,
        /// Its recorded birth epoch.
        birth_epoch: u64,
        /// The reported death epoch.
        epoch: u64,
    },

    /// An event arrived after the run was finished.
    #[error("the run is finalized; no further simulation events are accepted")]
    Finalized,

    /// The history writer failed. In-memory history is unaffected.
    #[error("writer error: {source}")]
    Writer {
        /// The underlying writer error.
        #[from]
        source: WriterError,
    },
}

/// Settings the engine needs from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Required number of genes per genome.
    pub genome_length: usize,
    /// Divisor policy for exported averages.
    pub average_divisor: AverageDivisor,
    /// Initial lifespan sample count policy.
    pub lifespan_baseline: LifespanBaseline,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&StatsConfig::default())
    }
}

impl From<&StatsConfig> for EngineSettings {
    fn from(config: &StatsConfig) -> Self {
        Self {
            genome_length: config.genome.length,
            average_divisor: config.statistics.average_divisor,
            lifespan_baseline: config.statistics.lifespan_baseline,
        }
    }
}

/// Orchestrates genotype tracking, accumulation, history, and hand-off.
#[derive(Debug)]
pub struct StatisticsEngine<S: StatisticsSink = NoOpSink> {
    tracker: GenotypeTracker,
    accumulator: EpochAccumulator,
    history: HistoryLog,
    sequencer: EpochSequencer,
    phase: EnginePhase,
    sink: S,
}

impl StatisticsEngine<NoOpSink> {
    /// Create an engine that discards snapshots.
    pub fn detached(settings: EngineSettings) -> Self {
        Self::new(settings, NoOpSink)
    }
}

impl<S: StatisticsSink> StatisticsEngine<S> {
    /// Create an engine delivering snapshots to `sink`.
    pub fn new(settings: EngineSettings, sink: S) -> Self {
        Self {
            tracker: GenotypeTracker::new(settings.genome_length),
            accumulator: EpochAccumulator::new(settings.lifespan_baseline),
            history: HistoryLog::new(settings.average_divisor),
            sequencer: EpochSequencer::new(),
            phase: EnginePhase::Idle,
            sink,
        }
    }

    /// Record the birth of `animal`.
    ///
    /// Notifies the sink only when the dominant genotype was updated.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Finalized`] after [`finish`](Self::finish), or
    /// [`EngineError::Genotype`] if the genome is rejected.
    pub fn on_animal_birth(&mut self, animal: &Animal) -> Result<BirthOutcome, EngineError> {
        self.open_for_events()?;
        let outcome = self.tracker.on_birth(&animal.genome)?;
        if outcome.dominant_updated {
            self.notify_dominant(None, DominanceCause::Birth);
        }
        Ok(outcome)
    }

    /// Record that `animal` is alive during the current epoch.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Finalized`] after [`finish`](Self::finish).
    pub fn on_animal_alive(&mut self, animal: &Animal) -> Result<(), EngineError> {
        self.open_for_events()?;
        self.accumulator.record_alive(animal.energy, animal.children);
        Ok(())
    }

    /// Record the death of `animal` during `epoch`.
    ///
    /// The age at death feeds the run-long lifespan average, the genotype
    /// count is decremented, and the dominant genotype is recomputed. A
    /// dominant-genotype notice is always sent, whether or not it changed.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Finalized`] after [`finish`](Self::finish)
    /// - [`EngineError::Epoch`] if `epoch` was already closed
    /// - [`EngineError::DeathBeforeBirth`] if `epoch` precedes the birth
    /// - [`EngineError::Genotype`] if no live animal carries the genome
    ///
    /// No statistic is modified when an error is returned.
    pub fn on_animal_death(
        &mut self,
        animal: &Animal,
        epoch: u64,
    ) -> Result<DeathOutcome, EngineError> {
        self.open_for_events()?;
        self.sequencer.check_event(epoch)?;
        let age = animal
            .age_at(epoch)
            .ok_or(EngineError::DeathBeforeBirth {
                animal: animal.id,
                birth_epoch: animal.birth_epoch,
                epoch,
            })?;

        let outcome = self.tracker.on_death(&animal.genome)?;
        self.accumulator.record_death(age);
        self.notify_dominant(Some(epoch), DominanceCause::Death);
        Ok(outcome)
    }

    /// Add a change in the plant count reported by the simulation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Finalized`] after [`finish`](Self::finish).
    pub fn on_plant_delta(&mut self, delta: i64) -> Result<(), EngineError> {
        self.open_for_events()?;
        self.accumulator.record_plant_delta(delta);
        Ok(())
    }

    /// Close `epoch`: finalize its statistics, append them to the history,
    /// and hand the snapshot to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Finalized`] after [`finish`](Self::finish), or
    /// [`EngineError::Epoch`] if `epoch` is not strictly greater than the
    /// previously closed epoch. Nothing is reset in either case.
    pub fn close_epoch(&mut self, epoch: u64) -> Result<EpochSnapshot, EngineError> {
        if self.phase == EnginePhase::Finalized {
            return Err(EngineError::Finalized);
        }
        self.sequencer.close(epoch)?;

        let stats = self.accumulator.finalize_epoch();
        let record = EpochRecord { epoch, stats };
        self.history.append(record);

        let snapshot = EpochSnapshot::from(&record);
        self.sink.on_epoch(&snapshot);
        self.phase = EnginePhase::EpochClosed;

        debug!(
            epoch,
            alive = stats.alive_count,
            plants = stats.plant_count,
            average_energy = stats.average_energy,
            genotypes = self.tracker.distinct_genotypes(),
            "Epoch closed"
        );
        Ok(snapshot)
    }

    /// Compute the export dataset (with a fresh average block) and hand it
    /// to `writer`.
    ///
    /// The dataset is complete in memory before the writer is called, so a
    /// writer failure leaves the history intact and the export can simply
    /// be retried.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::History`] if no epoch was closed yet, or
    /// [`EngineError::Writer`] if the writer fails.
    pub fn export(&mut self, writer: &mut dyn HistoryWriter) -> Result<Vec<HistoryRow>, EngineError> {
        let rows = self.history.export_with_averages()?;
        if let Err(e) = writer.write_history(&rows) {
            warn!(error = %e, "History export failed; in-memory history kept");
            return Err(e.into());
        }
        info!(rows = rows.len(), epochs = self.history.len(), "History exported");
        Ok(rows)
    }

    /// Export the history and finalize the run.
    ///
    /// The engine is finalized even if the export fails; later calls to
    /// [`export`](Self::export) are still accepted.
    ///
    /// # Errors
    ///
    /// Same as [`export`](Self::export).
    pub fn finish(&mut self, writer: &mut dyn HistoryWriter) -> Result<Vec<HistoryRow>, EngineError> {
        let result = self.export(writer);
        self.phase = EnginePhase::Finalized;
        info!(epochs = self.history.len(), "Statistics run finalized");
        result
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// The dominant genotype (or the sentinel).
    pub fn dominant(&self) -> DominantGenotype<'_> {
        self.tracker.dominant()
    }

    /// Whether `genome` is the current dominant genotype (highlight query).
    pub fn is_dominant(&self, genome: &Genome) -> bool {
        self.tracker.is_dominant(genome)
    }

    /// Statistics of the open epoch so far, without closing it.
    pub fn current_statistics(&self) -> StatisticsRecord {
        self.accumulator.current()
    }

    /// The genotype population.
    pub const fn genotypes(&self) -> &GenotypeTracker {
        &self.tracker
    }

    /// The epoch accumulator.
    pub const fn accumulator(&self) -> &EpochAccumulator {
        &self.accumulator
    }

    /// The run history.
    pub const fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The most recently closed epoch.
    pub const fn last_closed_epoch(&self) -> Option<u64> {
        self.sequencer.last_closed()
    }

    /// The sink receiving snapshots.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Move to `EpochOpen` unless the run is finalized.
    fn open_for_events(&mut self) -> Result<(), EngineError> {
        if !self.phase.accepts_events() {
            return Err(EngineError::Finalized);
        }
        self.phase = EnginePhase::EpochOpen;
        Ok(())
    }

    fn notify_dominant(&mut self, epoch: Option<u64>, cause: DominanceCause) {
        let dominant = self.tracker.dominant();
        let notice = DominantGenotypeNotice {
            epoch,
            genotype: dominant.genome.display_string(),
            count: dominant.count,
            cause,
        };
        debug!(
            ?cause,
            count = notice.count,
            genotype = %notice.genotype,
            "Dominant genotype notice"
        );
        self.sink.on_dominant_genotype(&notice);
    }
}
