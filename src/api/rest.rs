use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderName};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::presenter::{self, Classification};
use crate::domain::snapshot_service::SnapshotService;

/// Shared application state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub snapshots: Arc<SnapshotService>,
    pub fragment_header: HeaderName,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(snapshots: Arc<SnapshotService>, fragment_header: HeaderName) -> Self {
        Self {
            snapshots,
            fragment_header,
            started_at: Instant::now(),
        }
    }

    fn classify(&self, headers: &HeaderMap) -> Classification {
        Classification::from_headers(headers, &self.fragment_header)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonHealth {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/monitor/stats", get(system_stats))
        .route("/api/v1/monitor/processes", get(processes))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<DaemonHealth> {
    Json(DaemonHealth {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Fresh system snapshot. Probe failures degrade to zero values.
async fn system_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let classification = state.classify(&headers);
    let snapshot = state.snapshots.collect_system_snapshot().await;
    let body = presenter::present(&snapshot, classification)?;
    Ok((presenter::negotiation_headers(&state.fragment_header), body))
}

/// Fresh process list. 500 only when the process table cannot be listed.
async fn processes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let classification = state.classify(&headers);
    let snapshot = state.snapshots.collect_process_snapshot().await?;
    let body = presenter::present(&snapshot, classification)?;
    Ok((presenter::negotiation_headers(&state.fragment_header), body))
}
