//! Dashboard and data entry day views

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::DailyLedger;

use crate::error::AppResult;
use crate::services::ledger::DayEntries;
use crate::AppState;

#[derive(Deserialize)]
pub struct DateQuery {
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct AvailableCustomersResponse {
    pub date: NaiveDate,
    pub customers: Vec<String>,
    pub sale_entry_open: bool,
}

/// Same-day ledger with totals and profit/loss
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<DailyLedger>> {
    let date = state.ledger.resolve_date(query.date.as_deref())?;
    Ok(Json(state.ledger.daily_ledger(date).await?))
}

/// Records of one day plus the customers a sale may be recorded for
pub async fn get_day_entries(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<DayEntries>> {
    let date = state.ledger.resolve_date(Some(date.as_str()))?;
    Ok(Json(state.ledger.day_entries(date).await?))
}

pub async fn get_available_customers(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<AvailableCustomersResponse>> {
    let date = state.ledger.resolve_date(query.date.as_deref())?;
    let customers = state.ledger.available_customers(date).await?;

    Ok(Json(AvailableCustomersResponse {
        date,
        sale_entry_open: !customers.is_empty(),
        customers,
    }))
}
