//! End-to-end scenarios driving the statistics engine through several
//! epochs, the way a simulation loop would.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]

use evostat_core::config::StatsConfig;
use evostat_core::engine::{EngineError, EngineSettings, StatisticsEngine};
use evostat_core::epoch::EpochError;
use evostat_core::history::AverageDivisor;
use evostat_core::sink::{MemorySink, MemoryWriter};
use evostat_types::{Animal, DominanceCause, EnginePhase, Genome, HistoryRow};

fn settings(divisor: AverageDivisor) -> EngineSettings {
    let mut config = StatsConfig::default();
    config.genome.length = 4;
    config.statistics.average_divisor = divisor;
    EngineSettings::from(&config)
}

fn animal(genes: [u8; 4], birth_epoch: u64, energy: f64) -> Animal {
    Animal::new(Genome::new(genes.to_vec()), birth_epoch, energy)
}

fn cells(row: &HistoryRow) -> Vec<&str> {
    row.columns().iter().map(String::as_str).collect()
}

#[test]
fn dominant_genotype_follows_births_and_deaths() {
    let mut engine = StatisticsEngine::new(settings(AverageDivisor::EpochRows), MemorySink::default());
    let a1 = animal([1, 0, 0, 0], 0, 5.0);
    let a2 = animal([1, 0, 0, 0], 0, 5.0);
    let b = animal([2, 0, 0, 0], 0, 5.0);

    engine.on_animal_birth(&a1).unwrap();
    engine.on_animal_birth(&a2).unwrap();
    engine.on_animal_birth(&b).unwrap();
    assert_eq!(engine.dominant().genome, &a1.genome);
    assert_eq!(engine.dominant().count, 2);

    // A drops to a tie with B; the lower genome wins the rescan.
    engine.on_animal_death(&a1, 3).unwrap();
    assert_eq!(engine.dominant().count, 1);
    assert_eq!(engine.dominant().genome, &a1.genome);

    engine.on_animal_death(&a2, 3).unwrap();
    assert_eq!(engine.dominant().genome, &b.genome);

    engine.on_animal_death(&b, 4).unwrap();
    assert!(engine.dominant().is_sentinel());
    assert_eq!(engine.dominant().genome.display_string(), "0 0 0 0");

    let deaths: Vec<_> = engine
        .sink()
        .notices
        .iter()
        .filter(|n| n.cause == DominanceCause::Death)
        .collect();
    assert_eq!(deaths.len(), 3);
    assert_eq!(deaths[2].genotype, "0 0 0 0");
    assert_eq!(deaths[2].count, 0);
}

#[test]
fn three_epoch_run_exports_expected_rows() {
    let mut engine = StatisticsEngine::new(settings(AverageDivisor::EpochRows), MemorySink::default());
    let parent = animal([3, 3, 3, 3], 0, 10.0);
    let mut child = animal([3, 3, 3, 3], 1, 4.0);
    child.children = 0;

    engine.on_plant_delta(20).unwrap();
    engine.on_animal_birth(&parent).unwrap();
    engine.on_animal_alive(&parent).unwrap();
    engine.close_epoch(0).unwrap();

    let mut parent_after = parent.clone();
    parent_after.children = 1;
    parent_after.energy = 6.0;
    engine.on_plant_delta(-4).unwrap();
    engine.on_animal_birth(&child).unwrap();
    engine.on_animal_alive(&parent_after).unwrap();
    engine.on_animal_alive(&child).unwrap();
    engine.close_epoch(1).unwrap();

    engine.on_animal_death(&parent_after, 2).unwrap();
    engine.on_animal_alive(&child).unwrap();
    engine.close_epoch(2).unwrap();

    let mut writer = MemoryWriter::default();
    let rows = engine.finish(&mut writer).unwrap();
    assert_eq!(engine.phase(), EnginePhase::Finalized);

    assert_eq!(rows.len(), 6);
    assert_eq!(cells(&rows[1]), vec!["1.0", "20.0", "10.0", "0.0", "0.0"]);
    assert_eq!(cells(&rows[2]), vec!["2.0", "16.0", "5.0", "0.0", "1.0"]);
    // Seeded lifespan baseline: 2 / (1 + 1).
    assert_eq!(cells(&rows[3]), vec!["1.0", "16.0", "4.0", "1.0", "0.0"]);
    assert!(rows[4].is_average_marker());

    let epochs = &engine.sink().epochs;
    assert_eq!(epochs.iter().map(|s| s.epoch).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(writer.rows, rows);
}

#[test]
fn legacy_divisor_counts_the_header_row() {
    let mut engine = StatisticsEngine::detached(settings(AverageDivisor::IncludeHeader));
    for epoch in 0..3 {
        engine.on_plant_delta(4).unwrap();
        engine.close_epoch(epoch).unwrap();
    }
    let rows = engine.export(&mut MemoryWriter::default()).unwrap();
    // Plant totals 4, 8, 12 divided by 4.
    assert_eq!(cells(&rows[5])[1], "6.0");
}

#[test]
fn regression_leaves_everything_untouched() {
    let mut engine = StatisticsEngine::new(settings(AverageDivisor::EpochRows), MemorySink::default());
    engine.close_epoch(3).unwrap();
    let a = animal([0, 1, 0, 1], 3, 2.0);
    engine.on_animal_alive(&a).unwrap();

    let err = engine.close_epoch(2).unwrap_err();
    assert_eq!(
        err,
        EngineError::Epoch {
            source: EpochError::NonSequentialEpoch { last: 3, got: 2 }
        }
    );
    assert_eq!(engine.accumulator().alive_count(), 1);
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.last_closed_epoch(), Some(3));

    let snapshot = engine.close_epoch(4).unwrap();
    assert_eq!(snapshot.alive_count, 1.0);
}

#[test]
fn export_twice_without_new_epochs_is_identical() {
    let mut engine = StatisticsEngine::detached(settings(AverageDivisor::EpochRows));
    let a = animal([1, 2, 3, 4], 0, 7.5);
    engine.on_animal_birth(&a).unwrap();
    engine.on_animal_alive(&a).unwrap();
    engine.close_epoch(0).unwrap();
    engine.on_animal_alive(&a).unwrap();
    engine.close_epoch(1).unwrap();

    let mut writer = MemoryWriter::default();
    let first = engine.export(&mut writer).unwrap();
    let second = engine.export(&mut writer).unwrap();
    assert_eq!(first, second);
    assert_eq!(writer.writes, 2);

    engine.close_epoch(2).unwrap();
    let third = engine.export(&mut writer).unwrap();
    assert_eq!(third.len(), first.len() + 1);
    assert_eq!(third.iter().filter(|r| r.is_average_marker()).count(), 1);
}

#[test]
fn wrong_genome_length_is_rejected() {
    let mut engine = StatisticsEngine::detached(settings(AverageDivisor::EpochRows));
    let short = Animal::new(Genome::new(vec![1, 2]), 0, 1.0);
    let err = engine.on_animal_birth(&short).unwrap_err();
    assert!(matches!(err, EngineError::Genotype { .. }));
    assert_eq!(engine.genotypes().population(), 0);
}
