//! Liveness probes

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Probe response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Servers currently tracked by the liveness cache
    pub tracked_servers: usize,
    pub heartbeat_enabled: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    metrics::counter!("serverlist_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tracked_servers: state.manager.cache().len(),
        heartbeat_enabled: state.manager.settings().heartbeat_enabled,
    })
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}
