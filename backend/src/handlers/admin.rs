//! Data maintenance handlers: counts, import, clear

use axum::{extract::State, Json};
use shared::{LedgerSnapshot, RecordCounts};

use crate::error::AppResult;
use crate::AppState;

pub async fn get_counts(State(state): State<AppState>) -> AppResult<Json<RecordCounts>> {
    Ok(Json(state.ledger.counts().await?))
}

/// Replace all three collections; the body is validated as a whole first
pub async fn import_data(
    State(state): State<AppState>,
    Json(snapshot): Json<LedgerSnapshot>,
) -> AppResult<Json<RecordCounts>> {
    Ok(Json(state.ledger.import(snapshot).await?))
}

pub async fn clear_data(State(state): State<AppState>) -> AppResult<Json<RecordCounts>> {
    Ok(Json(state.ledger.clear_all().await?))
}
