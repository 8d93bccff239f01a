//! Observer startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds the listener eagerly, then serves the API on
//! a background Tokio task so it runs alongside the simulation loop.
//!
//! ```rust,ignore
//! use evostat_observer::startup::spawn_observer;
//! use evostat_observer::{AppState, ServerConfig};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::default());
//! let observer = spawn_observer(&ServerConfig::default(), state).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A running observer server.
#[derive(Debug)]
pub struct ObserverHandle {
    /// The address actually bound (resolves port 0).
    pub addr: SocketAddr,
    /// The background server task.
    pub task: JoinHandle<()>,
}

/// Spawn the observer HTTP server on a background Tokio task.
///
/// The server runs until the task is aborted or the runtime shuts down.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<ObserverHandle, StartupError> {
    let listener = crate::server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let task = tokio::spawn(async move {
        if let Err(e) = crate::server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok(ObserverHandle { addr, task })
}
