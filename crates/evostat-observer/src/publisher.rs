//! Hand-off from the statistics engine to the render task.
//!
//! The engine runs on the simulation thread and must never wait on the
//! observer. [`ChannelSink`] pushes every snapshot and notice onto an
//! unbounded FIFO queue; [`spawn_render_task`] drains it on a Tokio task,
//! updates the [`SeriesSnapshot`](crate::state::SeriesSnapshot), and
//! rebroadcasts to `WebSocket` clients. One producer plus FIFO delivery
//! keeps chart points in epoch order.

use std::sync::Arc;

use evostat_core::sink::StatisticsSink;
use evostat_types::{DominantGenotypeNotice, EpochSnapshot};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::state::{AppState, ObserverMessage};

/// A [`StatisticsSink`] that enqueues messages for the render task.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ObserverMessage>,
    closed_reported: bool,
}

impl ChannelSink {
    /// Wrap an existing sender.
    pub const fn new(tx: mpsc::UnboundedSender<ObserverMessage>) -> Self {
        Self {
            tx,
            closed_reported: false,
        }
    }

    /// Create a sink together with the receiver the render task drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ObserverMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Whether the render side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&mut self, message: ObserverMessage) {
        if self.tx.send(message).is_err() && !self.closed_reported {
            warn!("Render task is gone; further chart updates are dropped");
            self.closed_reported = true;
        }
    }
}

impl StatisticsSink for ChannelSink {
    fn on_epoch(&mut self, snapshot: &EpochSnapshot) {
        self.send(ObserverMessage::Epoch(*snapshot));
    }

    fn on_dominant_genotype(&mut self, notice: &DominantGenotypeNotice) {
        self.send(ObserverMessage::Dominant(notice.clone()));
    }
}

/// Drain `rx` on a background task until every sender is dropped.
///
/// The handle resolves to the number of messages applied.
pub fn spawn_render_task(
    mut rx: mpsc::UnboundedReceiver<ObserverMessage>,
    state: Arc<AppState>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut applied: u64 = 0;
        while let Some(message) = rx.recv().await {
            state.series.write().await.apply(&message);
            state.broadcast(&message);
            applied = applied.saturating_add(1);
        }
        debug!(applied, "Render task finished");
        applied
    })
}
