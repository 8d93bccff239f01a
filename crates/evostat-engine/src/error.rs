//! Error types for the Evostat binary.
//!
//! [`AppError`] wraps every failure mode during startup, the epoch loop,
//! and the final export, so `main` can propagate with `?`.

/// Top-level error for the Evostat binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: evostat_core::config::ConfigError,
    },

    /// The statistics engine rejected an event or the export failed.
    #[error("statistics error: {source}")]
    Statistics {
        /// The underlying engine error.
        #[from]
        source: evostat_core::engine::EngineError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: evostat_observer::StartupError,
    },

    /// The render task panicked or was cancelled.
    #[error("render task error: {message}")]
    Render {
        /// Description of the failure.
        message: String,
    },

    /// Logging could not be initialized.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
