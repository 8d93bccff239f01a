//! Synthetic population driver.
//!
//! Stands in for a full grid simulation: it keeps a list of animals and
//! a plant stock, plays one epoch at a time, and reports every birth,
//! death, living animal, and plant change to the statistics engine
//! before closing the epoch.
//!
//! Each epoch:
//!
//! 1. every animal pays the move cost and may eat one plant
//! 2. animals out of energy die
//! 3. well-fed animals pair up and breed (crossover plus optional point
//!    mutation) while the population is under its cap
//! 4. plants regrow
//! 5. living animals are reported and the epoch is closed
//!
//! Runs are reproducible for a given seed.

use evostat_core::config::DriverConfig;
use evostat_core::engine::{EngineError, StatisticsEngine};
use evostat_core::sink::StatisticsSink;
use evostat_types::{Animal, Genome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// What happened during one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochReport {
    /// The epoch that was closed.
    pub epoch: u64,
    /// Animals born this epoch.
    pub births: u32,
    /// Animals that died this epoch.
    pub deaths: u32,
    /// Animals alive at the end of the epoch.
    pub alive: usize,
    /// Plants standing at the end of the epoch.
    pub plants: u32,
}

/// Drives a synthetic population through the statistics engine.
#[derive(Debug)]
pub struct PopulationDriver {
    config: DriverConfig,
    genome_length: usize,
    rng: StdRng,
    animals: Vec<Animal>,
    plants: u32,
    next_epoch: u64,
}

impl PopulationDriver {
    /// Create a driver with an empty world.
    pub fn new(config: &DriverConfig, genome_length: usize) -> Self {
        Self {
            config: config.clone(),
            genome_length,
            rng: StdRng::seed_from_u64(config.seed),
            animals: Vec::new(),
            plants: 0,
            next_epoch: 0,
        }
    }

    /// Place the founding animals and plants.
    ///
    /// Founders share a small pool of random genotypes so a dominant one
    /// exists from the start.
    ///
    /// # Errors
    ///
    /// Propagates any [`EngineError`] from the birth or plant events.
    pub fn seed<S: StatisticsSink>(
        &mut self,
        engine: &mut StatisticsEngine<S>,
    ) -> Result<(), EngineError> {
        let pool: Vec<Genome> = (0..self.config.founder_genotypes.max(1))
            .map(|_| self.random_genome())
            .collect();

        for (genome, _) in pool.iter().cycle().zip(0..self.config.initial_animals) {
            let animal = Animal::new(genome.clone(), 0, self.config.start_energy);
            engine.on_animal_birth(&animal)?;
            self.animals.push(animal);
        }

        self.plants = self.config.initial_plants;
        engine.on_plant_delta(i64::from(self.plants))?;

        info!(
            animals = self.animals.len(),
            genotypes = pool.len(),
            plants = self.plants,
            "Founding population placed"
        );
        Ok(())
    }

    /// Play one epoch and close it in the engine.
    ///
    /// # Errors
    ///
    /// Propagates any [`EngineError`] from the reported events.
    pub fn step<S: StatisticsSink>(
        &mut self,
        engine: &mut StatisticsEngine<S>,
    ) -> Result<EpochReport, EngineError> {
        let epoch = self.next_epoch;
        let plants_before = self.plants;

        self.move_and_forage();
        let deaths = self.remove_dead(engine, epoch)?;
        let births = self.breed(engine, epoch)?;

        self.plants = self.plants.saturating_add(self.config.plants_per_epoch);
        engine.on_plant_delta(i64::from(self.plants).saturating_sub(i64::from(plants_before)))?;

        for animal in &self.animals {
            engine.on_animal_alive(animal)?;
        }
        engine.close_epoch(epoch)?;
        self.next_epoch = epoch.saturating_add(1);

        let report = EpochReport {
            epoch,
            births,
            deaths,
            alive: self.animals.len(),
            plants: self.plants,
        };
        debug!(?report, "Epoch played");
        Ok(report)
    }

    /// Animals currently alive.
    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    /// Plants currently standing.
    pub const fn plants(&self) -> u32 {
        self.plants
    }

    /// The next epoch to be played.
    pub const fn next_epoch(&self) -> u64 {
        self.next_epoch
    }

    fn move_and_forage(&mut self) {
        for animal in &mut self.animals {
            animal.energy -= self.config.move_cost;
            if self.plants > 0 && self.rng.random_bool(self.config.forage_chance) {
                animal.energy += self.config.plant_energy;
                self.plants = self.plants.saturating_sub(1);
            }
        }
    }

    fn remove_dead<S: StatisticsSink>(
        &mut self,
        engine: &mut StatisticsEngine<S>,
        epoch: u64,
    ) -> Result<u32, EngineError> {
        let (dead, alive): (Vec<Animal>, Vec<Animal>) = std::mem::take(&mut self.animals)
            .into_iter()
            .partition(|a| a.energy <= 0.0);
        self.animals = alive;

        let mut deaths: u32 = 0;
        for animal in &dead {
            engine.on_animal_death(animal, epoch)?;
            deaths = deaths.saturating_add(1);
        }
        Ok(deaths)
    }

    fn breed<S: StatisticsSink>(
        &mut self,
        engine: &mut StatisticsEngine<S>,
        epoch: u64,
    ) -> Result<u32, EngineError> {
        let eligible: Vec<usize> = self
            .animals
            .iter()
            .enumerate()
            .filter(|(_, a)| a.energy >= self.config.breed_threshold)
            .map(|(i, _)| i)
            .collect();

        let cap = usize::try_from(self.config.max_population).unwrap_or(usize::MAX);
        let mut newborns = Vec::new();
        for pair in eligible.chunks_exact(2) {
            if self.animals.len().saturating_add(newborns.len()) >= cap {
                break;
            }
            let [a, b] = pair else { continue };
            let parents = (
                self.animals.get(*a).map(|m| m.genome.clone()),
                self.animals.get(*b).map(|f| f.genome.clone()),
            );
            let (Some(mother), Some(father)) = parents else {
                continue;
            };
            let genome = self.offspring_genome(&mother, &father);

            for parent in [*a, *b] {
                if let Some(p) = self.animals.get_mut(parent) {
                    p.energy -= self.config.breed_cost;
                    p.children = p.children.saturating_add(1);
                }
            }
            newborns.push(Animal::new(genome, epoch, self.config.breed_cost * 2.0));
        }

        let mut births: u32 = 0;
        for child in newborns {
            engine.on_animal_birth(&child)?;
            self.animals.push(child);
            births = births.saturating_add(1);
        }
        Ok(births)
    }

    /// One-point crossover followed by an optional point mutation.
    fn offspring_genome(&mut self, mother: &Genome, father: &Genome) -> Genome {
        let split = self.rng.random_range(0..=self.genome_length);
        let mut genes: Vec<u8> = mother
            .genes()
            .iter()
            .take(split)
            .chain(father.genes().iter().skip(split))
            .copied()
            .collect();

        if self.rng.random_bool(self.config.mutation_chance) {
            let locus = self.rng.random_range(0..self.genome_length.max(1));
            let value = self.rng.random_range(0..self.config.gene_values.max(1));
            if let Some(gene) = genes.get_mut(locus) {
                *gene = value;
            }
        }
        Genome::new(genes)
    }

    fn random_genome(&mut self) -> Genome {
        let values = self.config.gene_values.max(1);
        Genome::new(
            (0..self.genome_length)
                .map(|_| self.rng.random_range(0..values))
                .collect(),
        )
    }
}
