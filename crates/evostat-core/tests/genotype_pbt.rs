//! Property tests for genotype tracking, accumulation, and history export.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::cast_precision_loss,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeMap;

use evostat_core::accumulator::{EpochAccumulator, LifespanBaseline};
use evostat_core::genotype::GenotypeTracker;
use evostat_core::history::HistoryLog;
use evostat_types::{EpochRecord, Genome, HistoryRow};
use proptest::prelude::*;

const GENOME_LENGTH: usize = 2;

/// A population event over a small alphabet of genomes.
#[derive(Debug, Clone, Copy)]
enum Event {
    Birth(u8),
    Death(u8),
}

fn genome(index: u8) -> Genome {
    Genome::new(vec![index / 3, index % 3])
}

prop_compose! {
    fn arb_event()(index in 0u8..6, birth in prop::bool::weighted(0.6)) -> Event {
        if birth { Event::Birth(index) } else { Event::Death(index) }
    }
}

/// Highest count, then lowest genome.
fn brute_force_dominant(model: &BTreeMap<Genome, u32>) -> Option<(Genome, u32)> {
    model
        .iter()
        .filter(|(_, count)| **count > 0)
        .max_by(|(ga, ca), (gb, cb)| ca.cmp(cb).then_with(|| gb.cmp(ga)))
        .map(|(g, c)| (g.clone(), *c))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn counts_match_births_minus_deaths(events in prop::collection::vec(arb_event(), 0..200)) {
        let mut tracker = GenotypeTracker::new(GENOME_LENGTH);
        let mut model: BTreeMap<Genome, u32> = BTreeMap::new();

        for event in events {
            match event {
                Event::Birth(i) => {
                    tracker.on_birth(&genome(i)).unwrap();
                    *model.entry(genome(i)).or_insert(0) += 1;
                }
                Event::Death(i) => {
                    let g = genome(i);
                    let expected = model.get(&g).copied().unwrap_or(0);
                    let result = tracker.on_death(&g);
                    if expected == 0 {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert_eq!(result.unwrap().remaining, expected - 1);
                        model.insert(g, expected - 1);
                    }
                }
            }

            for i in 0..6 {
                let g = genome(i);
                prop_assert_eq!(tracker.count_of(&g), model.get(&g).copied().unwrap_or(0));
            }
            let live: u64 = model.values().map(|c| u64::from(*c)).sum();
            prop_assert_eq!(tracker.population(), live);
        }
    }

    #[test]
    fn dominant_count_is_always_the_maximum(events in prop::collection::vec(arb_event(), 0..200)) {
        let mut tracker = GenotypeTracker::new(GENOME_LENGTH);
        let mut model: BTreeMap<Genome, u32> = BTreeMap::new();

        for event in events {
            let before = tracker.dominant().genome.clone();
            let mut rescanned = false;
            let mut rejected = false;
            match event {
                Event::Birth(i) => {
                    tracker.on_birth(&genome(i)).unwrap();
                    *model.entry(genome(i)).or_insert(0) += 1;
                }
                Event::Death(i) => {
                    let g = genome(i);
                    if tracker.on_death(&g).is_ok() {
                        rescanned = true;
                        if let Some(count) = model.get_mut(&g) {
                            *count -= 1;
                        }
                    } else {
                        rejected = true;
                    }
                }
            }

            if rejected {
                // A rejected death leaves the dominant genome unchanged.
                prop_assert_eq!(tracker.dominant().genome, &before);
            }

            let dominant = tracker.dominant();
            match brute_force_dominant(&model) {
                None => {
                    prop_assert!(dominant.is_sentinel());
                    prop_assert_eq!(dominant.genome, &Genome::zeroed(GENOME_LENGTH));
                }
                Some((best, best_count)) => {
                    prop_assert_eq!(dominant.count, best_count);
                    prop_assert_eq!(tracker.count_of(dominant.genome), best_count);
                    if rescanned {
                        // After a rescan the tie-break is fully determined.
                        prop_assert_eq!(dominant.genome, &best);
                    }
                }
            }
        }
    }

    #[test]
    fn accumulator_reset_keeps_run_long_counters(
        epochs in prop::collection::vec(
            (
                prop::collection::vec((0.0f64..100.0, 0u32..10), 0..20),
                prop::collection::vec(0u64..50, 0..5),
                -20i64..20,
            ),
            1..20,
        )
    ) {
        let mut acc = EpochAccumulator::new(LifespanBaseline::Exact);
        let mut plants = 0i64;
        let mut deaths = 0u64;
        let mut ages = 0u64;

        for (alive, died, delta) in epochs {
            let samples_before = acc.lifetime_samples();
            for (energy, children) in &alive {
                acc.record_alive(*energy, *children);
            }
            for age in &died {
                acc.record_death(*age);
                deaths += 1;
                ages += age;
            }
            acc.record_plant_delta(delta);
            plants += delta;

            prop_assert!(acc.lifetime_samples() >= samples_before);

            let record = acc.finalize_epoch();
            prop_assert_eq!(record.alive_count, alive.len() as u64);
            prop_assert_eq!(record.plant_count, plants);
            prop_assert!(record.average_energy.is_finite());
            prop_assert!(record.average_energy >= 0.0);
            let expected_lifespan = ages as f64 / deaths.max(1) as f64;
            prop_assert!((record.average_lifespan - expected_lifespan).abs() < 1e-9);

            prop_assert_eq!(acc.alive_count(), 0);
            prop_assert_eq!(acc.children_sum(), 0);
            prop_assert!(acc.energy_sum().abs() < f64::EPSILON);
        }
    }

    #[test]
    fn export_keeps_a_single_average_block(
        alive in prop::collection::vec(0u64..500, 1..30),
        exports in 1usize..4
    ) {
        let mut log = HistoryLog::default();
        for (epoch, count) in alive.iter().enumerate() {
            let mut acc = EpochAccumulator::default();
            for _ in 0..*count {
                acc.record_alive(1.0, 0);
            }
            log.append(EpochRecord { epoch: epoch as u64, stats: acc.finalize_epoch() });
        }

        let first = log.export_with_averages().unwrap();
        for _ in 1..exports {
            prop_assert_eq!(&log.export_with_averages().unwrap(), &first);
        }

        prop_assert_eq!(first.len(), alive.len() + 3);
        prop_assert_eq!(&first[0], &HistoryRow::header());
        prop_assert_eq!(first.iter().filter(|r| r.is_average_marker()).count(), 1);
        prop_assert!(first[first.len() - 2].is_average_marker());
    }
}
