use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub provider_configured: bool,
    pub api_key_required: bool,
    pub persistence_configured: bool,
}

/// GET /health
/// Reports readiness without revealing any configured secret.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        provider_configured: state.llm.is_some(),
        api_key_required: state.config.api_key.is_some(),
        persistence_configured: state.db.is_some(),
    })
}
