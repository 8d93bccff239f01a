//! REST endpoint handlers for the observer server.
//!
//! All handlers read the in-memory [`SeriesSnapshot`](crate::state::SeriesSnapshot)
//! through the shared [`AppState`]; none of them touch the engine.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/series` | Retained epoch snapshots (`?since=E&limit=N`) |
//! | `GET` | `/api/latest` | Most recent epoch snapshot |
//! | `GET` | `/api/dominant` | Most recent dominant-genotype notice |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use evostat_types::EpochSnapshot;

use crate::error::ObserverError;
use crate::state::AppState;

/// Query parameters for `GET /api/series`.
#[derive(Debug, serde::Deserialize)]
pub struct SeriesQuery {
    /// Only return snapshots with an epoch greater than or equal to this.
    pub since: Option<u64>,
    /// Maximum number of snapshots to return, newest kept.
    pub limit: Option<usize>,
}

/// Serve a minimal HTML page with the latest figures and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let series = state.series.read().await;
    let run_name = series.run_name.clone();
    let started_at = series.started_at.to_rfc3339();
    let epochs = series.epochs_received;
    let (epoch, alive, plants) = series.latest.map_or_else(
        || (String::from("-"), String::from("-"), String::from("-")),
        |s| {
            (
                s.epoch.to_string(),
                s.alive_count.to_string(),
                s.plant_count.to_string(),
            )
        },
    );
    let dominant = series
        .dominant
        .as_ref()
        .map_or_else(|| String::from("-"), |d| format!("[{}] x{}", d.genotype, d.count));

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Evostat Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        li::before {{ content: "GET "; color: #7ee787; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Evostat Observer</h1>
    <p class="subtitle">Run {run_name}, started {started_at}</p>

    <div>
        <div class="metric"><div class="label">Epoch</div><div class="value">{epoch}</div></div>
        <div class="metric"><div class="label">Epochs received</div><div class="value">{epochs}</div></div>
        <div class="metric"><div class="label">Animals</div><div class="value">{alive}</div></div>
        <div class="metric"><div class="label">Plants</div><div class="value">{plants}</div></div>
        <div class="metric"><div class="label">Dominant genotype</div><div class="value">{dominant}</div></div>
    </div>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/api/series">/api/series</a> -- Epoch series (?since=E&amp;limit=N)</li>
        <li><a href="/api/latest">/api/latest</a> -- Latest epoch</li>
        <li><a href="/api/dominant">/api/dominant</a> -- Dominant genotype</li>
    </ul>

    <h2>WebSocket</h2>
    <p><code>ws://host:port/ws/epochs</code> -- Live epoch and genotype stream</p>
</body>
</html>"#
    ))
}

/// Return the retained epoch series, oldest first.
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let series = state.series.read().await;

    let mut points: Vec<EpochSnapshot> = series
        .points
        .iter()
        .filter(|p| query.since.is_none_or(|since| p.epoch >= since))
        .copied()
        .collect();
    if let Some(limit) = query.limit {
        let excess = points.len().saturating_sub(limit);
        points.drain(..excess);
    }

    let body = serde_json::json!({
        "run_id": series.run_id,
        "run_name": series.run_name,
        "started_at": series.started_at,
        "epochs_received": series.epochs_received,
        "max_points": series.max_points(),
        "count": points.len(),
        "points": serde_json::to_value(&points)?,
    });
    Ok(Json(body))
}

/// Return the most recent epoch snapshot.
pub async fn get_latest(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let series = state.series.read().await;
    series
        .latest
        .map(Json)
        .ok_or_else(|| ObserverError::NotFound(String::from("no epoch has been closed yet")))
}

/// Return the most recent dominant-genotype notice.
pub async fn get_dominant(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let series = state.series.read().await;
    series
        .dominant
        .clone()
        .map(Json)
        .ok_or_else(|| ObserverError::NotFound(String::from("no dominant genotype reported yet")))
}
