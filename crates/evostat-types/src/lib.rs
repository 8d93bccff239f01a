//! Shared type definitions for the Evostat evolution statistics observer.
//!
//! This crate is the single source of truth for the data that flows
//! between the simulation loop, the statistics core, and the external
//! collaborators (chart renderer, history writer). Payload types are
//! exported to `TypeScript` via `ts-rs` for dashboards.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for animals and runs
//! - [`genome`] -- The [`Genome`] value type and its arena handle [`GenomeId`]
//! - [`enums`] -- Engine phases and dominance-change causes
//! - [`structs`] -- Animal events, per-epoch records, snapshots, history rows

pub mod enums;
pub mod genome;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DominanceCause, EnginePhase};
pub use genome::{DEFAULT_GENOME_LENGTH, Genome, GenomeId};
pub use ids::{AnimalId, RunId};
pub use structs::{
    AVERAGE_MARKER, Animal, COLUMN_COUNT, DominantGenotypeNotice, EpochRecord, EpochSnapshot,
    HISTORY_HEADER, HistoryRow, StatisticsRecord, format_cell,
};

#[cfg(test)]
mod tests {
    //! Binding generation for the observer payload types.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to the `bindings/` directory relative to
        // the crate root when `export_all` runs.
        use ts_rs::TS;

        let _ = crate::ids::AnimalId::export_all();
        let _ = crate::ids::RunId::export_all();
        let _ = crate::genome::Genome::export_all();
        let _ = crate::enums::DominanceCause::export_all();
        let _ = crate::enums::EnginePhase::export_all();
        let _ = crate::structs::StatisticsRecord::export_all();
        let _ = crate::structs::EpochSnapshot::export_all();
        let _ = crate::structs::DominantGenotypeNotice::export_all();
    }
}
