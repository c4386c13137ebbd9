//! Sales report rows and CSV export

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{format_rupiah, LedgerTotals, RangeReport};

use crate::error::{AppError, AppResult};

/// One CSV line of the sales report
#[derive(Debug, Serialize)]
pub struct SalesReportRow {
    /// `YYYY-MM-DD`, or `TOTAL` for the closing line
    pub date: String,
    pub preorder_quantity: u64,
    pub preorder_customers: usize,
    pub purchase_quantity: u64,
    pub purchase_weight_kg: Decimal,
    pub purchase_total: Decimal,
    pub sales_quantity: u64,
    pub sales_weight_kg: Decimal,
    pub sales_total: Decimal,
    pub sales_transactions: usize,
    pub profit_loss: Decimal,
    pub profit_loss_rupiah: String,
    pub status: String,
}

impl SalesReportRow {
    fn new(date: String, totals: &LedgerTotals) -> Self {
        Self {
            date,
            preorder_quantity: totals.total_preorder_quantity,
            preorder_customers: totals.preorder_customer_count,
            purchase_quantity: totals.total_purchase_quantity,
            purchase_weight_kg: totals.total_purchase_weight,
            purchase_total: totals.total_purchase_price,
            sales_quantity: totals.total_sales_quantity,
            sales_weight_kg: totals.total_sales_weight,
            sales_total: totals.total_sales_price,
            sales_transactions: totals.sales_transaction_count,
            profit_loss: totals.profit_loss,
            profit_loss_rupiah: format_rupiah(totals.profit_loss),
            status: totals.profit_status.label_id().to_string(),
        }
    }
}

/// Flatten a range report into CSV rows: one per day, then the grand total
pub fn report_rows(report: &RangeReport) -> Vec<SalesReportRow> {
    report
        .days
        .iter()
        .map(|day| SalesReportRow::new(day.date.format("%Y-%m-%d").to_string(), &day.totals))
        .chain(std::iter::once(SalesReportRow::new(
            "TOTAL".to_string(),
            &report.total,
        )))
        .collect()
}

/// Export report data as CSV
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let csv_data = String::from_utf8(
        wtr.into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
    )
    .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
    Ok(csv_data)
}
