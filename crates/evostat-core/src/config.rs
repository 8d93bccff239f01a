//! Configuration loading and typed config structures for Evostat.
//!
//! The canonical configuration lives in `evostat-config.yaml` in the
//! working directory. This module defines strongly-typed structs that
//! mirror the YAML structure, and provides a loader that reads and
//! validates the file. Every field has a default, so an empty file (or no
//! file at all) yields a usable configuration.

use std::path::{Path, PathBuf};

use evostat_types::DEFAULT_GENOME_LENGTH;
use serde::Deserialize;

use crate::accumulator::LifespanBaseline;
use crate::history::AverageDivisor;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `evostat-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsConfig {
    /// Run identification.
    #[serde(default)]
    pub run: RunConfig,

    /// Genome shape.
    #[serde(default)]
    pub genome: GenomeConfig,

    /// Statistics policies.
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Observer API server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// History export.
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Synthetic population driver used by the engine binary.
    #[serde(default)]
    pub driver: DriverConfig,
}

impl StatsConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `EVOSTAT_OBSERVER_PORT` overrides `observer.port`
    /// - `EVOSTAT_EXPORT_DIR` overrides `export.output_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override selected values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EVOSTAT_OBSERVER_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.observer.port = port,
                Err(e) => tracing::warn!(value = %val, error = %e, "Ignoring invalid EVOSTAT_OBSERVER_PORT"),
            }
        }
        if let Ok(val) = std::env::var("EVOSTAT_EXPORT_DIR") {
            self.export.output_dir = PathBuf::from(val);
        }
    }

    /// Check values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.genome.length == 0 {
            return Err(ConfigError::Invalid {
                reason: "genome.length must be at least 1".to_owned(),
            });
        }
        if self.observer.max_points == 0 {
            return Err(ConfigError::Invalid {
                reason: "observer.max_points must be at least 1".to_owned(),
            });
        }
        if self.driver.gene_values == 0 {
            return Err(ConfigError::Invalid {
                reason: "driver.gene_values must be at least 1".to_owned(),
            });
        }
        if !(0.0..=1.0).contains(&self.driver.forage_chance) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "driver.forage_chance must be within [0, 1], got {}",
                    self.driver.forage_chance
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.driver.mutation_chance) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "driver.mutation_chance must be within [0, 1], got {}",
                    self.driver.mutation_chance
                ),
            });
        }
        Ok(())
    }
}

/// Run identification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Human-readable run (map) name, used in export file names.
    #[serde(default = "default_run_name")]
    pub name: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: default_run_name(),
        }
    }
}

/// Genome shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenomeConfig {
    /// Number of genes every genome must carry.
    #[serde(default = "default_genome_length")]
    pub length: usize,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            length: default_genome_length(),
        }
    }
}

/// Statistics policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StatisticsConfig {
    /// Divisor used for the exported column averages.
    #[serde(default)]
    pub average_divisor: AverageDivisor,

    /// Initial value of the lifespan sample counter.
    #[serde(default)]
    pub lifespan_baseline: LifespanBaseline,
}

/// Observer API server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether the engine binary starts the observer server.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Host address to bind to.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_observer_port")]
    pub port: u16,

    /// Maximum number of epoch snapshots kept in memory for the API.
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_observer_host(),
            port: default_observer_port(),
            max_points: default_max_points(),
        }
    }
}

/// History export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportConfig {
    /// Directory the CSV history is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Whether the engine binary exports when the run finishes.
    #[serde(default = "default_true")]
    pub on_finish: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            on_finish: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Synthetic population driver parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of epochs to simulate.
    #[serde(default = "default_epochs")]
    pub epochs: u64,

    /// Real-time milliseconds to wait between epochs (0 = as fast as possible).
    #[serde(default)]
    pub epoch_interval_ms: u64,

    /// Animals spawned before the first epoch.
    #[serde(default = "default_initial_animals")]
    pub initial_animals: u32,

    /// Plants present before the first epoch.
    #[serde(default = "default_initial_plants")]
    pub initial_plants: u32,

    /// Plants grown every epoch.
    #[serde(default = "default_plants_per_epoch")]
    pub plants_per_epoch: u32,

    /// Hard cap on the living population.
    #[serde(default = "default_max_population")]
    pub max_population: u32,

    /// Energy of every initial animal.
    #[serde(default = "default_start_energy")]
    pub start_energy: f64,

    /// Energy spent by every animal each epoch.
    #[serde(default = "default_move_cost")]
    pub move_cost: f64,

    /// Energy gained by eating one plant.
    #[serde(default = "default_plant_energy")]
    pub plant_energy: f64,

    /// Probability that an animal finds a plant in a given epoch.
    #[serde(default = "default_forage_chance")]
    pub forage_chance: f64,

    /// Minimum energy both parents need to breed.
    #[serde(default = "default_breed_threshold")]
    pub breed_threshold: f64,

    /// Energy each parent hands to a child.
    #[serde(default = "default_breed_cost")]
    pub breed_cost: f64,

    /// Probability that a child's genome receives one point mutation.
    #[serde(default = "default_mutation_chance")]
    pub mutation_chance: f64,

    /// Number of distinct gene values (genes are drawn from `0..gene_values`).
    #[serde(default = "default_gene_values")]
    pub gene_values: u8,

    /// Number of distinct founder genotypes in the initial population.
    #[serde(default = "default_founder_genotypes")]
    pub founder_genotypes: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            epochs: default_epochs(),
            epoch_interval_ms: 0,
            initial_animals: default_initial_animals(),
            initial_plants: default_initial_plants(),
            plants_per_epoch: default_plants_per_epoch(),
            max_population: default_max_population(),
            start_energy: default_start_energy(),
            move_cost: default_move_cost(),
            plant_energy: default_plant_energy(),
            forage_chance: default_forage_chance(),
            breed_threshold: default_breed_threshold(),
            breed_cost: default_breed_cost(),
            mutation_chance: default_mutation_chance(),
            gene_values: default_gene_values(),
            founder_genotypes: default_founder_genotypes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_run_name() -> String {
    "evostat".to_owned()
}

const fn default_genome_length() -> usize {
    DEFAULT_GENOME_LENGTH
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

const fn default_max_points() -> usize {
    10_000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_epochs() -> u64 {
    500
}

const fn default_initial_animals() -> u32 {
    40
}

const fn default_initial_plants() -> u32 {
    120
}

const fn default_plants_per_epoch() -> u32 {
    25
}

const fn default_max_population() -> u32 {
    600
}

const fn default_start_energy() -> f64 {
    30.0
}

const fn default_move_cost() -> f64 {
    1.0
}

const fn default_plant_energy() -> f64 {
    8.0
}

const fn default_forage_chance() -> f64 {
    0.4
}

const fn default_breed_threshold() -> f64 {
    20.0
}

const fn default_breed_cost() -> f64 {
    6.0
}

const fn default_mutation_chance() -> f64 {
    0.15
}

const fn default_gene_values() -> u8 {
    8
}

const fn default_founder_genotypes() -> u32 {
    6
}

const fn default_true() -> bool {
    true
}
