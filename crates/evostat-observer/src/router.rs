//! Axum router construction for the observer API.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the observer server.
///
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/epochs` -- `WebSocket` stream of observer messages
/// - `GET /api/series` -- retained epoch series
/// - `GET /api/latest` -- latest epoch snapshot
/// - `GET /api/dominant` -- latest dominant-genotype notice
///
/// CORS allows any origin so a dashboard can be served separately.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws/epochs", get(ws::ws_epochs))
        .route("/api/series", get(handlers::get_series))
        .route("/api/latest", get(handlers::get_latest))
        .route("/api/dominant", get(handlers::get_dominant))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
