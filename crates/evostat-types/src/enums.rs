//! Enumeration types for the Evostat statistics engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Why a dominant-genotype notification was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum DominanceCause {
    /// A birth pushed a genotype above the recorded dominant count.
    Birth,
    /// An animal died; the dominant genotype was recomputed from scratch.
    Death,
}

/// Lifecycle phase of the statistics engine.
///
/// ```text
/// Idle --event--> EpochOpen --close--> EpochClosed --event--> EpochOpen ...
///                                          \--finish--> Finalized
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    /// No event has been received yet.
    Idle,
    /// Events for the current epoch are accumulating.
    EpochOpen,
    /// The last epoch was closed and its snapshot emitted.
    EpochClosed,
    /// The run was finished; only exports are still accepted.
    Finalized,
}

impl EnginePhase {
    /// Whether the engine still accepts simulation events.
    pub const fn accepts_events(self) -> bool {
        !matches!(self, Self::Finalized)
    }
}
