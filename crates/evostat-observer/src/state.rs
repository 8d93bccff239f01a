//! Shared application state for the observer server.
//!
//! [`AppState`] holds the broadcast channel that feeds `WebSocket`
//! clients and the in-memory [`SeriesSnapshot`] that the REST endpoints
//! serve. The render task is its only writer.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use evostat_types::{DominantGenotypeNotice, EpochSnapshot, RunId};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use ts_rs::TS;

/// Capacity of the broadcast channel for observer messages.
///
/// A subscriber that falls behind by more than this many messages
/// receives [`broadcast::error::RecvError::Lagged`] and skips ahead.
const BROADCAST_CAPACITY: usize = 256;

/// Default number of epoch snapshots retained for the API.
pub const DEFAULT_MAX_POINTS: usize = 10_000;

/// A message handed from the statistics engine to the render task and
/// rebroadcast to `WebSocket` clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ObserverMessage {
    /// A closed epoch.
    Epoch(EpochSnapshot),
    /// A dominant-genotype notice.
    Dominant(DominantGenotypeNotice),
}

/// The chart series as seen by the observer.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSnapshot {
    /// Identifier of this run.
    pub run_id: RunId,
    /// Human-readable run name.
    pub run_name: String,
    /// When the observer state was created.
    pub started_at: DateTime<Utc>,
    /// Most recent epoch snapshots, oldest first.
    pub points: VecDeque<EpochSnapshot>,
    /// The latest epoch snapshot, kept even if `points` was trimmed.
    pub latest: Option<EpochSnapshot>,
    /// The latest dominant-genotype notice.
    pub dominant: Option<DominantGenotypeNotice>,
    /// Total number of epochs received.
    pub epochs_received: u64,
    /// Retention limit for `points`.
    #[serde(skip)]
    max_points: usize,
}

impl SeriesSnapshot {
    /// Create an empty series retaining at most `max_points` snapshots.
    pub fn new(run_name: impl Into<String>, max_points: usize) -> Self {
        Self {
            run_id: RunId::new(),
            run_name: run_name.into(),
            started_at: Utc::now(),
            points: VecDeque::new(),
            latest: None,
            dominant: None,
            epochs_received: 0,
            max_points,
        }
    }

    /// Apply one message from the engine.
    pub fn apply(&mut self, message: &ObserverMessage) {
        match message {
            ObserverMessage::Epoch(snapshot) => {
                self.points.push_back(*snapshot);
                while self.points.len() > self.max_points {
                    self.points.pop_front();
                }
                self.latest = Some(*snapshot);
                self.epochs_received = self.epochs_received.saturating_add(1);
            }
            ObserverMessage::Dominant(notice) => {
                self.dominant = Some(notice.clone());
            }
        }
    }

    /// Retention limit for the point series.
    pub const fn max_points(&self) -> usize {
        self.max_points
    }
}

impl Default for SeriesSnapshot {
    fn default() -> Self {
        Self::new("evostat", DEFAULT_MAX_POINTS)
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for observer messages.
    pub tx: broadcast::Sender<ObserverMessage>,
    /// The chart series (written by the render task).
    pub series: Arc<RwLock<SeriesSnapshot>>,
}

impl AppState {
    /// Create a new application state with an empty series.
    pub fn new(run_name: impl Into<String>, max_points: usize) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            series: Arc::new(RwLock::new(SeriesSnapshot::new(run_name, max_points))),
        }
    }

    /// Subscribe to the message broadcast.
    pub fn subscribe(&self) -> broadcast::Receiver<ObserverMessage> {
        self.tx.subscribe()
    }

    /// Publish a message to all connected clients.
    ///
    /// Returns the number of receivers reached; 0 when no client is
    /// connected.
    pub fn broadcast(&self, message: &ObserverMessage) -> usize {
        self.tx.send(message.clone()).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new("evostat", DEFAULT_MAX_POINTS)
    }
}
