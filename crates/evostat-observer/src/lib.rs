//! Chart feed and observer API server for Evostat.
//!
//! The statistics engine hands every closed epoch and every
//! dominant-genotype notice to a [`ChannelSink`]. A render task drains
//! the queue in order, keeps the recent series in a [`SeriesSnapshot`],
//! and rebroadcasts each message. This crate serves that state over:
//!
//! - **`WebSocket`** (`/ws/epochs`) for live chart updates via
//!   [`tokio::sync::broadcast`], with lag handling
//! - **REST** (`/api/series`, `/api/latest`, `/api/dominant`)
//! - **Minimal HTML status page** (`GET /`)
//!
//! The engine never waits on any of this; REST reads go through a
//! [`tokio::sync::RwLock`] written only by the render task.
//!
//! [`ChannelSink`]: publisher::ChannelSink
//! [`SeriesSnapshot`]: state::SeriesSnapshot

pub mod error;
pub mod handlers;
pub mod publisher;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use publisher::{ChannelSink, spawn_render_task};
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::{ObserverHandle, StartupError, spawn_observer};
pub use state::{AppState, ObserverMessage, SeriesSnapshot};
