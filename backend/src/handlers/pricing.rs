//! Derived-total preview handler

use axum::{extract::State, Json};
use shared::PricePreviewForm;

use crate::error::AppResult;
use crate::services::ledger::PricePreview;
use crate::AppState;

/// Compute `round(weight × price_per_kg)` without storing anything
pub async fn preview_total(
    State(state): State<AppState>,
    Json(form): Json<PricePreviewForm>,
) -> AppResult<Json<PricePreview>> {
    Ok(Json(state.ledger.preview_total(&form)?))
}
