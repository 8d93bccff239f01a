//! Error types for the export layer.

/// Errors that can occur while writing an export file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV encoder failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
