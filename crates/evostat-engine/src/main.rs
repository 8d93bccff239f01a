//! Evostat binary.
//!
//! Wires the statistics engine to a synthetic population driver, the
//! observer API, and the CSV exporter, then plays the configured number
//! of epochs.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `evostat-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the observer state and start the render task
//! 4. Start the observer API server (optional)
//! 5. Create the statistics engine and seed the population
//! 6. Play the epochs
//! 7. Finish the run and export the history
//! 8. Log the summary, keep serving until Ctrl-C if the observer runs

mod driver;
mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use evostat_core::config::{LoggingConfig, StatsConfig};
use evostat_core::engine::{EngineError, EngineSettings, StatisticsEngine};
use evostat_export::CsvHistoryWriter;
use evostat_observer::{AppState, ChannelSink, ServerConfig, spawn_observer, spawn_render_task};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::driver::PopulationDriver;
use crate::error::AppError;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "evostat-config.yaml";

/// Epochs between progress log lines.
const PROGRESS_EVERY: u64 = 50;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging, or the run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("evostat-engine starting");
    info!(
        source,
        run = config.run.name,
        genome_length = config.genome.length,
        average_divisor = ?config.statistics.average_divisor,
        lifespan_baseline = ?config.statistics.lifespan_baseline,
        seed = config.driver.seed,
        epochs = config.driver.epochs,
        "Configuration loaded"
    );

    run(config).await?;

    info!("evostat-engine shutdown complete");
    Ok(())
}

async fn run(config: StatsConfig) -> Result<(), AppError> {
    // 3. Observer state and render task.
    let app_state = Arc::new(AppState::new(
        config.run.name.clone(),
        config.observer.max_points,
    ));
    let (sink, rx) = ChannelSink::channel();
    let render = spawn_render_task(rx, Arc::clone(&app_state));

    // 4. Observer API server.
    let observer = if config.observer.enabled {
        let handle =
            spawn_observer(&ServerConfig::from(&config.observer), Arc::clone(&app_state)).await?;
        info!(addr = %handle.addr, "Observer API server started");
        Some(handle)
    } else {
        info!("Observer disabled");
        None
    };

    // 5. Statistics engine and founding population.
    let started_at = Utc::now();
    let mut engine = StatisticsEngine::new(EngineSettings::from(&config), sink);
    let mut driver = PopulationDriver::new(&config.driver, config.genome.length);
    driver.seed(&mut engine)?;

    // 6. Epoch loop.
    let pause = Duration::from_millis(config.driver.epoch_interval_ms);
    for _ in 0..config.driver.epochs {
        let report = driver.step(&mut engine)?;
        if report.epoch.checked_rem(PROGRESS_EVERY) == Some(0) {
            info!(
                epoch = report.epoch,
                alive = report.alive,
                births = report.births,
                deaths = report.deaths,
                plants = report.plants,
                genotypes = engine.genotypes().distinct_genotypes(),
                "Progress"
            );
        }
        if pause.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(pause).await;
        }
    }

    // 7. Finish and export.
    if config.export.on_finish {
        let mut writer =
            CsvHistoryWriter::for_run(&config.export.output_dir, &config.run.name, started_at);
        match engine.finish(&mut writer) {
            Ok(rows) => {
                info!(path = %writer.path().display(), rows = rows.len(), "History exported");
            }
            Err(EngineError::History { source }) => {
                warn!(error = %source, "Nothing to export");
            }
            Err(e) => return Err(e.into()),
        }
    }

    // 8. Summary.
    {
        let dominant = engine.dominant();
        info!(
            epochs = engine.history().len(),
            next_epoch = driver.next_epoch(),
            alive = driver.animals().len(),
            plants = driver.plants(),
            genotypes = engine.genotypes().distinct_genotypes(),
            dominant_genotype = %dominant.genome,
            dominant_count = dominant.count,
            phase = ?engine.phase(),
            "Run complete"
        );
    }

    // Dropping the engine closes the queue; the render task drains it.
    drop(engine);
    let applied = render.await.map_err(|e| AppError::Render {
        message: e.to_string(),
    })?;
    debug!(applied, "Render task drained");

    if let Some(handle) = observer {
        info!(addr = %handle.addr, "Observer still serving the finished run; press Ctrl-C to exit");
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
        handle.task.abort();
    }

    Ok(())
}

/// Load configuration from `evostat-config.yaml`, or defaults when the
/// file does not exist. Environment overrides apply in both cases.
fn load_config() -> Result<(StatsConfig, &'static str), AppError> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        Ok((StatsConfig::from_file(path)?, CONFIG_FILE))
    } else {
        Ok((StatsConfig::parse("")?, "defaults"))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| AppError::Logging {
            message: format!("invalid log filter {:?}: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let result = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| AppError::Logging {
        message: e.to_string(),
    })
}
