//! Incremental statistics and dominant-genotype tracking for the Evostat
//! evolution observer.
//!
//! The simulation loop feeds birth, alive, death, and plant events into a
//! [`StatisticsEngine`]. At every epoch boundary the engine finalizes a
//! statistics record, appends it to the run history, and hands a snapshot
//! to a [`StatisticsSink`]. On demand the history is exported, with a
//! trailing column-average block, to a [`HistoryWriter`].
//!
//! # Modules
//!
//! - [`accumulator`] -- Per-epoch resettable sums plus run-long lifespan
//!   and plant counters.
//! - [`config`] -- Configuration loading from `evostat-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- The [`StatisticsEngine`] orchestrator and its phase
//!   state machine.
//! - [`epoch`] -- Strictly increasing epoch sequencing.
//! - [`genotype`] -- Live genotype counts and the dominant genotype.
//! - [`history`] -- Append-only epoch history with idempotent averages.
//! - [`registry`] -- Arena that owns genomes and hands out stable IDs.
//! - [`sink`] -- [`StatisticsSink`] and [`HistoryWriter`] seams.
//!
//! [`StatisticsEngine`]: engine::StatisticsEngine
//! [`StatisticsSink`]: sink::StatisticsSink
//! [`HistoryWriter`]: sink::HistoryWriter

pub mod accumulator;
pub mod config;
pub mod engine;
pub mod epoch;
pub mod genotype;
pub mod history;
pub mod registry;
pub mod sink;
