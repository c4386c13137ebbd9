//! WebAssembly module for the poultry ledger
//!
//! Runs the same pricing, validation and daily aggregation rules as the
//! server, so the data entry form can preview totals and flag bad fields
//! before submitting. Structured values cross the boundary as JSON text.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

use shared::{compute_total_price, DailyLedger, FieldError};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    web_sys::console::log_1(&JsValue::from_str("poultry ledger wasm ready"));
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn decimal(field: &str, value: f64) -> Result<Decimal, String> {
    Decimal::from_str(&value.to_string()).map_err(|_| format!("{} is not a finite number", field))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date {:?}, expected YYYY-MM-DD", value))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to encode result: {}", e))
}

fn from_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn total_price(weight: f64, price_per_kg: f64) -> Result<f64, String> {
    let total = compute_total_price(decimal("weight", weight)?, decimal("price_per_kg", price_per_kg)?)
        .map_err(|e| e.to_string())?;
    total
        .to_string()
        .parse()
        .map_err(|_| "total is out of range".to_string())
}

fn daily_summary(snapshot_json: &str, date: &str) -> Result<String, String> {
    let snapshot: LedgerSnapshot = from_json("snapshot", snapshot_json)?;
    to_json(&DailyLedger::for_date(&snapshot, parse_date(date)?))
}

fn customers_for(preorders_json: &str, date: &str) -> Result<String, String> {
    let preorders: Vec<Preorder> = from_json("preorders", preorders_json)?;
    to_json(&shared::available_customers(&preorders, parse_date(date)?))
}

/// Field errors of a form as JSON; `[]` means the form would be accepted
fn form_errors<T>(result: Result<T, ValidationErrors>) -> Result<String, String> {
    let errors: Vec<FieldError> = match result {
        Ok(_) => Vec::new(),
        Err(e) => e.0,
    };
    to_json(&errors)
}

fn check_purchase(form_json: &str, today: &str) -> Result<String, String> {
    let form: PurchaseForm = from_json("purchase form", form_json)?;
    form_errors(form.validate(parse_date(today)?))
}

fn check_preorder(form_json: &str, today: &str) -> Result<String, String> {
    let form: PreorderForm = from_json("preorder form", form_json)?;
    form_errors(form.validate(parse_date(today)?))
}

fn check_sale(form_json: &str, preorders_json: &str, today: &str) -> Result<String, String> {
    let form: SaleForm = from_json("sale form", form_json)?;
    let preorders: Vec<Preorder> = from_json("preorders", preorders_json)?;
    let today = parse_date(today)?;

    let date = match form.entry_date(today) {
        Ok(date) => date,
        Err(e) => return form_errors::<()>(Err(e)),
    };
    let available = shared::available_customers(&preorders, date);
    form_errors(form.validate(today, &available))
}

/// Derived total `round(weight × price_per_kg)` in whole Rupiah
#[wasm_bindgen]
pub fn calculate_total_price(weight: f64, price_per_kg: f64) -> Result<f64, JsValue> {
    total_price(weight, price_per_kg).map_err(to_js)
}

/// Format an amount as `Rp 1.260.000`
#[wasm_bindgen]
pub fn format_rupiah(amount: f64) -> String {
    match Decimal::from_str(&amount.to_string()) {
        Ok(amount) => shared::format_rupiah(amount),
        Err(_) => shared::format_rupiah(Decimal::ZERO),
    }
}

/// Same-day ledger (records plus totals) for `date`, as JSON
#[wasm_bindgen]
pub fn summarize_day(snapshot_json: &str, date: &str) -> Result<String, JsValue> {
    daily_summary(snapshot_json, date).map_err(to_js)
}

/// JSON array of customers who may be sold to on `date`
#[wasm_bindgen]
pub fn available_customers(preorders_json: &str, date: &str) -> Result<String, JsValue> {
    customers_for(preorders_json, date).map_err(to_js)
}

#[wasm_bindgen]
pub fn validate_preorder_form(form_json: &str, today: &str) -> Result<String, JsValue> {
    check_preorder(form_json, today).map_err(to_js)
}

#[wasm_bindgen]
pub fn validate_purchase_form(form_json: &str, today: &str) -> Result<String, JsValue> {
    check_purchase(form_json, today).map_err(to_js)
}

/// Sale form check against the preorders known to the client
#[wasm_bindgen]
pub fn validate_sale_form(form_json: &str, preorders_json: &str, today: &str) -> Result<String, JsValue> {
    check_sale(form_json, preorders_json, today).map_err(to_js)
}
