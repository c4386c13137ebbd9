//! Preorder, purchase and sale handlers

use axum::{extract::State, http::StatusCode, Json};
use shared::{Preorder, PreorderForm, Purchase, PurchaseForm, Sale, SaleForm};

use crate::error::AppResult;
use crate::services::ledger::CommandOutcome;
use crate::AppState;

/// List every preorder in insertion order
pub async fn list_preorders(State(state): State<AppState>) -> AppResult<Json<Vec<Preorder>>> {
    Ok(Json(state.ledger.preorders().await?))
}

/// Record a new preorder
pub async fn create_preorder(
    State(state): State<AppState>,
    Json(form): Json<PreorderForm>,
) -> AppResult<(StatusCode, Json<CommandOutcome<Preorder>>)> {
    let outcome = state.ledger.create_preorder(&form).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn list_purchases(State(state): State<AppState>) -> AppResult<Json<Vec<Purchase>>> {
    Ok(Json(state.ledger.purchases().await?))
}

/// Record a new purchase; `total_price` is derived, never read from input
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(form): Json<PurchaseForm>,
) -> AppResult<(StatusCode, Json<CommandOutcome<Purchase>>)> {
    let outcome = state.ledger.create_purchase(&form).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn list_sales(State(state): State<AppState>) -> AppResult<Json<Vec<Sale>>> {
    Ok(Json(state.ledger.sales().await?))
}

/// Record a new sale to a customer who preordered for the same day
pub async fn create_sale(
    State(state): State<AppState>,
    Json(form): Json<SaleForm>,
) -> AppResult<(StatusCode, Json<CommandOutcome<Sale>>)> {
    let outcome = state.ledger.create_sale(&form).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
