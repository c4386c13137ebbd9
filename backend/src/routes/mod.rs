//! Route definitions for the poultry ledger API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Daily views
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/entries/:date", get(handlers::get_day_entries))
        .route("/customers/available", get(handlers::get_available_customers))
        // Record collections
        .route(
            "/preorders",
            get(handlers::list_preorders).post(handlers::create_preorder),
        )
        .route(
            "/purchases",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route("/sales", get(handlers::list_sales).post(handlers::create_sale))
        .route("/pricing/preview", post(handlers::preview_total))
        .route("/reports/sales", get(handlers::get_sales_report))
        .nest("/admin", admin_routes())
}

/// Data maintenance routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/counts", get(handlers::get_counts))
        .route(
            "/data",
            put(handlers::import_data).delete(handlers::clear_data),
        )
}
