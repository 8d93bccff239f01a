//! History export for Evostat.
//!
//! [`CsvHistoryWriter`] implements the core [`HistoryWriter`] seam and
//! persists an export dataset as a `;`-separated file named
//! `<run>-Stats-<unix seconds>.csv`.
//!
//! # Modules
//!
//! - [`csv_writer`] -- The CSV writer and file naming
//! - [`error`] -- [`ExportError`]
//!
//! [`HistoryWriter`]: evostat_core::sink::HistoryWriter

pub mod csv_writer;
pub mod error;

pub use csv_writer::{CsvHistoryWriter, DELIMITER, export_file_name};
pub use error::ExportError;
