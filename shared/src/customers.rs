//! Available-customer resolver for sale entry

use chrono::NaiveDate;

use crate::ledger::filter_by_date;
use crate::models::Preorder;

/// Customer names eligible for a sale on `date`.
///
/// One entry per preorder of that day, in insertion order. Duplicates are
/// kept because each preorder row is a separate selectable entry. An empty
/// result means sale entry is closed for the day.
pub fn available_customers(preorders: &[Preorder], date: NaiveDate) -> Vec<String> {
    filter_by_date(preorders, date)
        .into_iter()
        .map(|p| p.customer_name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_keeps_order_and_duplicates() {
        let preorders = vec![
            Preorder::new(day("2025-01-01"), "Pak Budi", 10),
            Preorder::new(day("2025-01-02"), "Bu Sari", 4),
            Preorder::new(day("2025-01-01"), "Bu Rina", 6),
            Preorder::new(day("2025-01-01"), "Pak Budi", 2),
        ];

        assert_eq!(
            available_customers(&preorders, day("2025-01-01")),
            vec!["Pak Budi", "Bu Rina", "Pak Budi"]
        );
    }

    #[test]
    fn test_empty_when_no_preorders_that_day() {
        let preorders = vec![Preorder::new(day("2025-01-02"), "Bu Sari", 4)];
        assert!(available_customers(&preorders, day("2025-01-01")).is_empty());
    }
}
