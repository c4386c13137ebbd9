//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub store: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check store connectivity
    let (status, store_status) = match state.ledger.ping().await {
        Ok(_) => ("healthy", "connected"),
        Err(e) => {
            tracing::warn!("Store ping failed: {}", e);
            ("degraded", "disconnected")
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.ledger.backend().to_string(),
        store: store_status.to_string(),
    })
}
