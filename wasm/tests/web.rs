//! Browser-side checks of the exported bindings

#![cfg(target_arch = "wasm32")]

use poultry_ledger_wasm::{
    available_customers, calculate_total_price, format_rupiah, summarize_day,
    validate_purchase_form,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn total_price_preview() {
    assert_eq!(calculate_total_price(45.0, 28000.0).unwrap(), 1_260_000.0);

    let err = calculate_total_price(0.0, 28000.0).unwrap_err();
    assert_eq!(err.as_string().unwrap(), "weight must be greater than zero");
}

#[wasm_bindgen_test]
fn rupiah_formatting() {
    assert_eq!(format_rupiah(344_000.0), "Rp 344.000");
}

#[wasm_bindgen_test]
fn day_summary_and_customers() {
    let preorders = r#"[{"id": "1", "customer_name": "Budi", "quantity": 10, "date": "2025-01-01"}]"#;
    assert_eq!(available_customers(preorders, "2025-01-01").unwrap(), r#"["Budi"]"#);

    let snapshot = format!(r#"{{"preorders": {}}}"#, preorders);
    let summary = summarize_day(&snapshot, "2025-01-01").unwrap();
    assert!(summary.contains(r#""total_preorder_quantity":10"#));

    assert!(summarize_day("not json", "2025-01-01").is_err());
}

#[wasm_bindgen_test]
fn purchase_form_reports_precision() {
    let errors = validate_purchase_form(
        r#"{"quantity": 30, "weight": "45.1234", "price_per_kg": 28000}"#,
        "2025-01-01",
    )
    .unwrap();
    assert!(errors.contains("too_precise"));
}
