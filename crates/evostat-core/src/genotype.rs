//! Live genotype population and dominant-genotype tracking.
//!
//! [`GenotypeTracker`] keeps a reference count per distinct live genome and
//! the genotype currently believed to be the most common one.
//!
//! # Update rules
//!
//! - **Birth**: O(1). The born genome's count is incremented; it becomes
//!   dominant only if its new count strictly exceeds the recorded dominant
//!   count. On a tie the incumbent keeps the title.
//! - **Death**: the count is decremented (the entry and its registry slot
//!   are released at zero), then every entry is rescanned. A decrement can
//!   dethrone the dominant genotype without telling us who overtook it, so
//!   no O(1) update is sound here.
//!
//! # Tie-break
//!
//! A rescan picks the highest count; among equal counts the
//! lexicographically lowest genome wins. The result never depends on map
//! iteration order.
//!
//! With no live animals the dominant genotype is the sentinel: an
//! all-zero genome of the configured length with count 0.

use std::collections::BTreeMap;

use evostat_types::{Genome, GenomeId};
use tracing::trace;

use crate::registry::{GenomeRegistry, RegistryError};

/// Errors that can occur while updating the genotype population.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenotypeError {
    /// A death referenced a genome with no live animals.
    #[error("unknown genotype: no live animal carries [{genotype}]")]
    UnknownGenotype {
        /// Display string of the offending genome.
        genotype: String,
    },

    /// A genome does not have the configured number of genes.
    #[error("genome length mismatch: expected {expected} genes, got {actual}")]
    GenomeLength {
        /// Configured genome length.
        expected: usize,
        /// Length of the offending genome.
        actual: usize,
    },

    /// A genotype count would exceed `u32::MAX`.
    #[error("genotype count overflow for [{genotype}]")]
    CountOverflow {
        /// Display string of the offending genome.
        genotype: String,
    },

    /// The genome registry ran out of slots.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Borrowed view of the dominant genotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominantGenotype<'a> {
    /// The dominant genome (the sentinel when nothing is alive).
    pub genome: &'a Genome,
    /// Its live count (0 for the sentinel).
    pub count: u32,
}

impl DominantGenotype<'_> {
    /// Whether this is the sentinel rather than a live genotype.
    pub const fn is_sentinel(&self) -> bool {
        self.count == 0
    }
}

/// Result of a birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthOutcome {
    /// Registry handle of the born genome.
    pub id: GenomeId,
    /// Live count of the genome after the birth.
    pub count: u32,
    /// Whether the recorded dominant `(genome, count)` pair was updated.
    pub dominant_updated: bool,
}

/// Result of a death.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathOutcome {
    /// Live count of the genome after the death.
    pub remaining: u32,
    /// Whether the dominant `(genome, count)` pair differs from before.
    pub dominant_updated: bool,
}

/// Reference-counted genotype population with a dominant-genotype pointer.
#[derive(Debug)]
pub struct GenotypeTracker {
    /// Owner of every live genome.
    registry: GenomeRegistry,
    /// Live count per genome; every value is at least 1.
    counts: BTreeMap<GenomeId, u32>,
    /// Current dominant pair, `None` when the sentinel applies.
    dominant: Option<(GenomeId, u32)>,
    /// All-zero genome reported when nothing is dominant.
    sentinel: Genome,
    /// Required number of genes.
    genome_length: usize,
    /// Total live animals across all genotypes.
    population: u64,
}

impl GenotypeTracker {
    /// Create an empty tracker for genomes of `genome_length` genes.
    pub fn new(genome_length: usize) -> Self {
        Self {
            registry: GenomeRegistry::new(),
            counts: BTreeMap::new(),
            dominant: None,
            sentinel: Genome::zeroed(genome_length),
            genome_length,
            population: 0,
        }
    }

    /// Record the birth of an animal carrying `genome`.
    ///
    /// # Errors
    ///
    /// Returns [`GenotypeError::GenomeLength`] for a genome of the wrong
    /// length, [`GenotypeError::CountOverflow`] if the count would overflow,
    /// or [`GenotypeError::Registry`] if the registry is exhausted.
    pub fn on_birth(&mut self, genome: &Genome) -> Result<BirthOutcome, GenotypeError> {
        self.check_length(genome)?;
        let id = self.registry.intern(genome)?;

        let count = self.counts.entry(id).or_insert(0);
        let new_count = count
            .checked_add(1)
            .ok_or_else(|| GenotypeError::CountOverflow {
                genotype: genome.display_string(),
            })?;
        *count = new_count;
        self.population = self.population.saturating_add(1);

        let dominant_count = self.dominant.map_or(0, |(_, c)| c);
        let dominant_updated = new_count > dominant_count;
        if dominant_updated {
            self.dominant = Some((id, new_count));
            trace!(%id, count = new_count, "Dominant genotype raised by birth");
        }

        Ok(BirthOutcome {
            id,
            count: new_count,
            dominant_updated,
        })
    }

    /// Record the death of an animal carrying `genome` and recompute the
    /// dominant genotype from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`GenotypeError::UnknownGenotype`] if no live animal carries
    /// `genome`. The population is left untouched in that case.
    pub fn on_death(&mut self, genome: &Genome) -> Result<DeathOutcome, GenotypeError> {
        let unknown = || GenotypeError::UnknownGenotype {
            genotype: genome.display_string(),
        };
        let id = self.registry.lookup(genome).ok_or_else(unknown)?;
        let count = self.counts.get_mut(&id).ok_or_else(unknown)?;

        let remaining = count.saturating_sub(1);
        if remaining == 0 {
            self.counts.remove(&id);
            self.registry.release(id);
        } else {
            *count = remaining;
        }
        self.population = self.population.saturating_sub(1);

        let previous = self.dominant;
        self.rescan();

        Ok(DeathOutcome {
            remaining,
            dominant_updated: previous != self.dominant,
        })
    }

    /// Return the dominant genotype (or the sentinel).
    pub fn dominant(&self) -> DominantGenotype<'_> {
        self.dominant
            .and_then(|(id, count)| {
                self.registry
                    .get(id)
                    .map(|genome| DominantGenotype { genome, count })
            })
            .unwrap_or(DominantGenotype {
                genome: &self.sentinel,
                count: 0,
            })
    }

    /// Whether `genome` is the current dominant genotype.
    ///
    /// The sentinel never matches, so an all-zero genome is not reported
    /// as dominant while nothing is alive.
    pub fn is_dominant(&self, genome: &Genome) -> bool {
        match (self.dominant, self.registry.lookup(genome)) {
            (Some((dominant_id, _)), Some(id)) => dominant_id == id,
            _ => false,
        }
    }

    /// Live count of `genome` (0 if none is alive).
    pub fn count_of(&self, genome: &Genome) -> u32 {
        self.registry
            .lookup(genome)
            .and_then(|id| self.counts.get(&id).copied())
            .unwrap_or(0)
    }

    /// Number of distinct live genotypes.
    pub fn distinct_genotypes(&self) -> usize {
        self.counts.len()
    }

    /// Total number of live animals.
    pub const fn population(&self) -> u64 {
        self.population
    }

    /// Required number of genes per genome.
    pub const fn genome_length(&self) -> usize {
        self.genome_length
    }

    /// Iterate over `(genome, count)` for every live genotype.
    pub fn iter(&self) -> impl Iterator<Item = (&Genome, u32)> + '_ {
        self.counts
            .iter()
            .filter_map(|(id, count)| self.registry.get(*id).map(|genome| (genome, *count)))
    }

    /// Recompute the exact dominant genotype over every live entry.
    fn rescan(&mut self) {
        let mut best: Option<(GenomeId, u32, &Genome)> = None;
        for (&id, &count) in &self.counts {
            let Some(genome) = self.registry.get(id) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((_, best_count, best_genome)) => {
                    count > best_count || (count == best_count && genome < best_genome)
                }
            };
            if better {
                best = Some((id, count, genome));
            }
        }
        let next = best.map(|(id, count, _)| (id, count));
        self.dominant = next;
    }

    fn check_length(&self, genome: &Genome) -> Result<(), GenotypeError> {
        if genome.len() == self.genome_length {
            Ok(())
        } else {
            Err(GenotypeError::GenomeLength {
                expected: self.genome_length,
                actual: genome.len(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn genome(genes: [u8; 4]) -> Genome {
        Genome::new(genes.to_vec())
    }

    fn tracker() -> GenotypeTracker {
        GenotypeTracker::new(4)
    }

    #[test]
    fn empty_tracker_reports_sentinel() {
        let tracker = tracker();
        let dominant = tracker.dominant();
        assert!(dominant.is_sentinel());
        assert_eq!(dominant.genome, &Genome::zeroed(4));
        assert!(!tracker.is_dominant(&Genome::zeroed(4)));
    }

    #[test]
    fn birth_creates_and_increments() {
        let mut tracker = tracker();
        let a = genome([1, 1, 1, 1]);
        let first = tracker.on_birth(&a).unwrap();
        let second = tracker.on_birth(&a).unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(second.count, 2);
        assert_eq!(first.id, second.id);
        assert_eq!(tracker.count_of(&a), 2);
        assert_eq!(tracker.population(), 2);
    }

    #[test]
    fn birth_tie_keeps_incumbent() {
        let mut tracker = tracker();
        let a = genome([5, 0, 0, 0]);
        let b = genome([1, 0, 0, 0]);
        tracker.on_birth(&a).unwrap();
        let outcome = tracker.on_birth(&b).unwrap();
        assert!(!outcome.dominant_updated);
        // b is lexicographically lower but births never rescan.
        assert_eq!(tracker.dominant().genome, &a);
    }

    #[test]
    fn aab_then_death_of_a_rescans() {
        let mut tracker = tracker();
        let a = genome([0, 1, 2, 3]);
        let b = genome([3, 2, 1, 0]);
        tracker.on_birth(&a).unwrap();
        tracker.on_birth(&a).unwrap();
        tracker.on_birth(&b).unwrap();
        assert_eq!(tracker.dominant().genome, &a);
        assert_eq!(tracker.dominant().count, 2);

        let outcome = tracker.on_death(&a).unwrap();
        assert_eq!(outcome.remaining, 1);
        assert!(outcome.dominant_updated);
        // A and B tie at 1; A is lexicographically lower.
        assert_eq!(tracker.dominant().genome, &a);
        assert_eq!(tracker.dominant().count, 1);
    }

    #[test]
    fn rescan_tie_prefers_lowest_genome() {
        let mut tracker = tracker();
        let high = genome([9, 9, 9, 9]);
        let low = genome([0, 0, 0, 1]);
        tracker.on_birth(&high).unwrap();
        tracker.on_birth(&high).unwrap();
        tracker.on_birth(&low).unwrap();
        tracker.on_death(&high).unwrap();
        assert_eq!(tracker.dominant().genome, &low);
        assert!(tracker.is_dominant(&low));
        assert!(!tracker.is_dominant(&high));
    }

    #[test]
    fn last_death_falls_back_to_sentinel() {
        let mut tracker = tracker();
        let a = genome([2, 2, 2, 2]);
        tracker.on_birth(&a).unwrap();
        let outcome = tracker.on_death(&a).unwrap();
        assert_eq!(outcome.remaining, 0);
        assert!(tracker.dominant().is_sentinel());
        assert_eq!(tracker.distinct_genotypes(), 0);
        assert_eq!(tracker.population(), 0);
    }

    #[test]
    fn death_of_unknown_genome_is_rejected() {
        let mut tracker = tracker();
        let a = genome([1, 2, 3, 4]);
        let result = tracker.on_death(&a);
        assert!(matches!(result, Err(GenotypeError::UnknownGenotype { .. })));

        tracker.on_birth(&a).unwrap();
        tracker.on_death(&a).unwrap();
        // Count already reached zero: the entry is gone, not negative.
        let result = tracker.on_death(&a);
        assert!(matches!(result, Err(GenotypeError::UnknownGenotype { .. })));
        assert_eq!(tracker.count_of(&a), 0);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let mut tracker = tracker();
        let result = tracker.on_birth(&Genome::new(vec![1, 2]));
        assert_eq!(
            result,
            Err(GenotypeError::GenomeLength {
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(tracker.population(), 0);
    }

    #[test]
    fn iter_lists_live_genotypes() {
        let mut tracker = tracker();
        let a = genome([1, 0, 0, 0]);
        let b = genome([2, 0, 0, 0]);
        tracker.on_birth(&a).unwrap();
        tracker.on_birth(&b).unwrap();
        tracker.on_birth(&b).unwrap();
        let mut seen: Vec<(Genome, u32)> = tracker.iter().map(|(g, c)| (g.clone(), c)).collect();
        seen.sort();
        assert_eq!(seen, vec![(a, 1), (b, 2)]);
    }
}
