//! Daily filter and aggregator
//!
//! All dashboard figures are computed over the records of a single calendar
//! day. Dates are compared by exact equality; there is no range or timezone
//! normalization beyond what [`NaiveDate`] already encodes.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Dated, LedgerSnapshot, Preorder, Purchase, Sale};
use crate::types::DateRange;

/// Records whose date equals `date`, in their original order
pub fn filter_by_date<T: Dated>(records: &[T], date: NaiveDate) -> Vec<&T> {
    records.iter().filter(|r| r.date() == date).collect()
}

/// Classification of a profit/loss figure.
///
/// Only a strictly positive figure is a profit. An exact zero is
/// `BreakEven`, which counts as non-profitable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitStatus {
    Profit,
    #[default]
    BreakEven,
    Loss,
}

impl ProfitStatus {
    pub fn classify(profit_loss: Decimal) -> Self {
        if profit_loss > Decimal::ZERO {
            ProfitStatus::Profit
        } else if profit_loss < Decimal::ZERO {
            ProfitStatus::Loss
        } else {
            ProfitStatus::BreakEven
        }
    }

    pub fn is_profitable(&self) -> bool {
        matches!(self, ProfitStatus::Profit)
    }

    /// Indonesian label shown on the dashboard badge
    pub fn label_id(&self) -> &'static str {
        match self {
            ProfitStatus::Profit => "Untung",
            ProfitStatus::BreakEven => "Impas",
            ProfitStatus::Loss => "Rugi",
        }
    }
}

impl std::fmt::Display for ProfitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfitStatus::Profit => write!(f, "Profit"),
            ProfitStatus::BreakEven => write!(f, "Break Even"),
            ProfitStatus::Loss => write!(f, "Loss"),
        }
    }
}

/// Aggregate figures over a set of preorders, purchases and sales
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub total_preorder_quantity: u64,
    pub preorder_customer_count: usize,
    pub total_purchase_quantity: u64,
    #[serde(with = "crate::decimal_json")]
    pub total_purchase_weight: Decimal,
    #[serde(with = "crate::decimal_json")]
    pub total_purchase_price: Decimal,
    pub total_sales_quantity: u64,
    #[serde(with = "crate::decimal_json")]
    pub total_sales_weight: Decimal,
    #[serde(with = "crate::decimal_json")]
    pub total_sales_price: Decimal,
    pub sales_transaction_count: usize,
    /// `total_sales_price - total_purchase_price`, positive means profit
    #[serde(with = "crate::decimal_json")]
    pub profit_loss: Decimal,
    pub profit_status: ProfitStatus,
}

impl LedgerTotals {
    /// Aggregate the given records as-is (no date filtering).
    ///
    /// Sums saturate at the `Decimal` bounds; stored blobs written by other
    /// clients are not range checked on read.
    pub fn from_records<'a>(
        preorders: impl IntoIterator<Item = &'a Preorder>,
        purchases: impl IntoIterator<Item = &'a Purchase>,
        sales: impl IntoIterator<Item = &'a Sale>,
    ) -> Self {
        let mut totals = LedgerTotals::default();

        for preorder in preorders {
            totals.total_preorder_quantity += u64::from(preorder.quantity);
            totals.preorder_customer_count += 1;
        }

        for purchase in purchases {
            totals.total_purchase_quantity += u64::from(purchase.quantity);
            totals.total_purchase_weight =
                totals.total_purchase_weight.saturating_add(purchase.weight);
            totals.total_purchase_price =
                totals.total_purchase_price.saturating_add(purchase.total_price);
        }

        for sale in sales {
            totals.total_sales_quantity += u64::from(sale.quantity);
            totals.total_sales_weight = totals.total_sales_weight.saturating_add(sale.weight);
            totals.total_sales_price = totals.total_sales_price.saturating_add(sale.total_price);
            totals.sales_transaction_count += 1;
        }

        totals.profit_loss = totals
            .total_sales_price
            .saturating_sub(totals.total_purchase_price);
        totals.profit_status = ProfitStatus::classify(totals.profit_loss);
        totals
    }
}

/// Aggregates for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: LedgerTotals,
}

impl DailySummary {
    /// Filter full collections down to `date` and aggregate them
    pub fn compute(
        date: NaiveDate,
        preorders: &[Preorder],
        purchases: &[Purchase],
        sales: &[Sale],
    ) -> Self {
        Self {
            date,
            totals: LedgerTotals::from_records(
                filter_by_date(preorders, date),
                filter_by_date(purchases, date),
                filter_by_date(sales, date),
            ),
        }
    }
}

/// Same-day ledger: every record of one date plus its aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLedger {
    pub date: NaiveDate,
    pub preorders: Vec<Preorder>,
    pub purchases: Vec<Purchase>,
    pub sales: Vec<Sale>,
    pub summary: LedgerTotals,
}

impl DailyLedger {
    pub fn for_date(snapshot: &LedgerSnapshot, date: NaiveDate) -> Self {
        let preorders: Vec<Preorder> = filter_by_date(&snapshot.preorders, date)
            .into_iter()
            .cloned()
            .collect();
        let purchases: Vec<Purchase> = filter_by_date(&snapshot.purchases, date)
            .into_iter()
            .cloned()
            .collect();
        let sales: Vec<Sale> = filter_by_date(&snapshot.sales, date)
            .into_iter()
            .cloned()
            .collect();

        let summary = LedgerTotals::from_records(&preorders, &purchases, &sales);

        Self {
            date,
            preorders,
            purchases,
            sales,
            summary,
        }
    }
}

/// Day-by-day report over an inclusive date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// One entry per day that has at least one record, ascending
    pub days: Vec<DailySummary>,
    pub total: LedgerTotals,
}

impl RangeReport {
    pub fn build(snapshot: &LedgerSnapshot, range: &DateRange) -> Self {
        let in_range = |date: NaiveDate| range.contains(date);

        let active_days: BTreeSet<NaiveDate> = snapshot
            .preorders
            .iter()
            .map(Dated::date)
            .chain(snapshot.purchases.iter().map(Dated::date))
            .chain(snapshot.sales.iter().map(Dated::date))
            .filter(|d| in_range(*d))
            .collect();

        let days = active_days
            .into_iter()
            .map(|date| {
                DailySummary::compute(date, &snapshot.preorders, &snapshot.purchases, &snapshot.sales)
            })
            .collect();

        let total = LedgerTotals::from_records(
            snapshot.preorders.iter().filter(|r| in_range(r.date)),
            snapshot.purchases.iter().filter(|r| in_range(r.date)),
            snapshot.sales.iter().filter(|r| in_range(r.date)),
        );

        Self {
            start: range.start,
            end: range.end,
            days,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn preorder(name: &str, quantity: u32, date: &str) -> Preorder {
        Preorder::new(day(date), name, quantity)
    }

    fn purchase(quantity: u32, weight: &str, price: &str, date: &str) -> Purchase {
        Purchase::new(day(date), quantity, dec(weight), dec(price)).unwrap()
    }

    fn sale(name: &str, quantity: u32, weight: &str, price: &str, date: &str) -> Sale {
        Sale::new(day(date), name, quantity, dec(weight), dec(price)).unwrap()
    }

    #[test]
    fn test_preorder_scenario() {
        let preorders = vec![
            preorder("Budi", 10, "2025-01-01"),
            preorder("Sari", 5, "2025-01-02"),
        ];

        let summary = DailySummary::compute(day("2025-01-01"), &preorders, &[], &[]);

        assert_eq!(summary.totals.total_preorder_quantity, 10);
        assert_eq!(summary.totals.preorder_customer_count, 1);
    }

    #[test]
    fn test_empty_day_is_break_even() {
        let summary = DailySummary::compute(day("2025-01-01"), &[], &[], &[]);

        assert_eq!(summary.totals, LedgerTotals::default());
        assert_eq!(summary.totals.profit_loss, Decimal::ZERO);
        assert_eq!(summary.totals.profit_status, ProfitStatus::BreakEven);
        assert!(!summary.totals.profit_status.is_profitable());
    }

    #[test]
    fn test_huge_stored_totals_do_not_panic() {
        // Legacy blobs bypass the pricing bounds
        let huge = Purchase {
            id: "legacy".to_string(),
            quantity: 1,
            weight: dec("100000000000000"),
            price_per_kg: dec("100000000000000"),
            total_price: dec("10000000000000000000000000000"),
            date: day("2025-01-01"),
        };
        let purchases = vec![huge; 8];

        let summary = DailySummary::compute(day("2025-01-01"), &[], &purchases, &[]);

        assert_eq!(summary.totals.total_purchase_price, Decimal::MAX);
        assert_eq!(summary.totals.profit_loss, Decimal::MIN);
        assert_eq!(summary.totals.profit_status, ProfitStatus::Loss);
    }

    #[test]
    fn test_profit_and_loss() {
        let purchases = vec![purchase(30, "45.0", "28000", "2025-01-01")];
        let sales = vec![
            sale("Budi", 10, "16.0", "35000", "2025-01-01"),
            sale("Sari", 20, "29.0", "36000", "2025-01-01"),
        ];

        let summary = DailySummary::compute(day("2025-01-01"), &[], &purchases, &sales);

        // 560.000 + 1.044.000 - 1.260.000
        assert_eq!(summary.totals.total_sales_price, dec("1604000"));
        assert_eq!(summary.totals.total_purchase_price, dec("1260000"));
        assert_eq!(summary.totals.profit_loss, dec("344000"));
        assert_eq!(summary.totals.profit_status, ProfitStatus::Profit);
        assert_eq!(summary.totals.sales_transaction_count, 2);
        assert_eq!(summary.totals.total_sales_quantity, 30);
        assert_eq!(summary.totals.total_sales_weight, dec("45.0"));

        let loss = DailySummary::compute(day("2025-01-01"), &[], &purchases, &[]);
        assert_eq!(loss.totals.profit_loss, dec("-1260000"));
        assert_eq!(loss.totals.profit_status, ProfitStatus::Loss);
    }

    #[test]
    fn test_purchase_weight_and_quantity_sums() {
        let purchases = vec![
            purchase(30, "45.5", "28000", "2025-01-01"),
            purchase(20, "31.2", "27500", "2025-01-01"),
            purchase(99, "150", "27000", "2025-01-02"),
        ];

        let summary = DailySummary::compute(day("2025-01-01"), &[], &purchases, &[]);

        assert_eq!(summary.totals.total_purchase_quantity, 50);
        assert_eq!(summary.totals.total_purchase_weight, dec("76.7"));
        assert_eq!(
            summary.totals.total_purchase_price,
            dec("1274000") + dec("858000")
        );
    }

    #[test]
    fn test_filter_keeps_insertion_order() {
        let preorders = vec![
            preorder("Budi", 1, "2025-01-01"),
            preorder("Sari", 2, "2025-01-02"),
            preorder("Ahmad", 3, "2025-01-01"),
        ];

        let names: Vec<&str> = filter_by_date(&preorders, day("2025-01-01"))
            .into_iter()
            .map(|p| p.customer_name.as_str())
            .collect();

        assert_eq!(names, vec!["Budi", "Ahmad"]);
    }

    #[test]
    fn test_daily_ledger_contains_only_that_day() {
        let snapshot = LedgerSnapshot {
            preorders: vec![preorder("Budi", 10, "2025-01-01"), preorder("Sari", 5, "2025-01-02")],
            purchases: vec![purchase(30, "45.0", "28000", "2025-01-02")],
            sales: vec![sale("Sari", 5, "8.0", "35000", "2025-01-02")],
        };

        let ledger = DailyLedger::for_date(&snapshot, day("2025-01-02"));

        assert_eq!(ledger.preorders.len(), 1);
        assert_eq!(ledger.preorders[0].customer_name, "Sari");
        assert_eq!(ledger.purchases.len(), 1);
        assert_eq!(ledger.sales.len(), 1);
        assert_eq!(ledger.summary.profit_loss, dec("280000") - dec("1260000"));
    }

    #[test]
    fn test_range_report_lists_active_days() {
        let snapshot = LedgerSnapshot {
            preorders: vec![
                preorder("Budi", 10, "2025-01-03"),
                preorder("Sari", 5, "2025-01-01"),
                preorder("Joko", 7, "2025-02-01"),
            ],
            purchases: vec![purchase(30, "45.0", "28000", "2025-01-01")],
            sales: vec![],
        };
        let range = DateRange {
            start: day("2025-01-01"),
            end: day("2025-01-31"),
        };

        let report = RangeReport::build(&snapshot, &range);

        let dates: Vec<NaiveDate> = report.days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day("2025-01-01"), day("2025-01-03")]);
        assert_eq!(report.total.total_preorder_quantity, 15);
        assert_eq!(report.total.total_purchase_price, dec("1260000"));
    }

    #[test]
    fn test_summary_serializes_numbers() {
        let purchases = vec![purchase(30, "45.0", "28000", "2025-01-01")];
        let summary = DailySummary::compute(day("2025-01-01"), &[], &purchases, &[]);

        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["date"], "2025-01-01");
        assert!(json["total_purchase_price"].is_number());
        assert_eq!(json["total_purchase_price"].as_f64(), Some(1_260_000.0));
        assert_eq!(json["profit_status"], "loss");
    }

    #[test]
    fn test_profit_status_labels() {
        assert_eq!(ProfitStatus::Profit.label_id(), "Untung");
        assert_eq!(ProfitStatus::BreakEven.label_id(), "Impas");
        assert_eq!(ProfitStatus::Loss.label_id(), "Rugi");
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..5).prop_map(|offset| day("2025-01-01") + chrono::Duration::days(offset))
    }

    fn preorders_strategy() -> impl Strategy<Value = Vec<Preorder>> {
        prop::collection::vec((1u32..100, date_strategy()), 0..30).prop_map(|rows| {
            rows.into_iter()
                .map(|(quantity, date)| Preorder::new(date, "Pelanggan", quantity))
                .collect()
        })
    }

    fn purchases_strategy() -> impl Strategy<Value = Vec<Purchase>> {
        prop::collection::vec((1u32..100, 1i64..2_000, 20_000i64..40_000, date_strategy()), 0..30)
            .prop_map(|rows| {
                rows.into_iter()
                    .map(|(quantity, weight, price, date)| {
                        Purchase::new(date, quantity, Decimal::new(weight, 1), Decimal::from(price))
                            .unwrap()
                    })
                    .collect()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Filtering then summing equals summing a manually pre-filtered set
        #[test]
        fn prop_filter_and_aggregate_commute(
            preorders in preorders_strategy(),
            purchases in purchases_strategy(),
            target in date_strategy(),
        ) {
            let summary = DailySummary::compute(target, &preorders, &purchases, &[]);

            let manual_preorder_qty: u64 = preorders
                .iter()
                .filter(|p| p.date == target)
                .map(|p| u64::from(p.quantity))
                .sum();
            let manual_purchase_qty: u64 = purchases
                .iter()
                .filter(|p| p.date == target)
                .map(|p| u64::from(p.quantity))
                .sum();
            let manual_purchase_price: Decimal = purchases
                .iter()
                .filter(|p| p.date == target)
                .map(|p| p.total_price)
                .sum();

            prop_assert_eq!(summary.totals.total_preorder_quantity, manual_preorder_qty);
            prop_assert_eq!(summary.totals.total_purchase_quantity, manual_purchase_qty);
            prop_assert_eq!(summary.totals.total_purchase_price, manual_purchase_price);
        }

        /// Per-day totals add up to the whole-collection totals
        #[test]
        fn prop_no_double_counting(preorders in preorders_strategy()) {
            let whole: u64 = preorders.iter().map(|p| u64::from(p.quantity)).sum();
            let per_day: u64 = (0i64..5)
                .map(|offset| day("2025-01-01") + chrono::Duration::days(offset))
                .map(|d| DailySummary::compute(d, &preorders, &[], &[]).totals.total_preorder_quantity)
                .sum();

            prop_assert_eq!(whole, per_day);
        }
    }
}
