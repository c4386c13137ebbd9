//! Common types used across the ledger

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inclusive date range for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A raw form input as typed by the user.
///
/// Numbers may arrive as JSON numbers or as text; text that does not parse
/// is kept so validation can report it instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(Decimal),
    Text(String),
}

impl FormValue {
    /// Empty or whitespace-only text
    pub fn is_blank(&self) -> bool {
        matches!(self, FormValue::Text(s) if s.trim().is_empty())
    }

    /// Parse as a decimal; `None` when the text is not numeric
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            FormValue::Number(n) => Some(*n),
            FormValue::Text(s) => Decimal::from_str(s.trim()).ok(),
        }
    }
}

impl From<Decimal> for FormValue {
    fn from(value: Decimal) -> Self {
        FormValue::Number(value)
    }
}

impl From<u32> for FormValue {
    fn from(value: u32) -> Self {
        FormValue::Number(Decimal::from(value))
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_range_contains_both_ends() {
        let range = DateRange {
            start: day("2025-01-01"),
            end: day("2025-01-31"),
        };
        assert!(range.contains(day("2025-01-01")));
        assert!(range.contains(day("2025-01-31")));
        assert!(!range.contains(day("2025-02-01")));
        assert_eq!(range.len_days(), 31);
    }

    #[test]
    fn test_form_value_accepts_numbers_and_text() {
        let number: FormValue = serde_json::from_str("45.5").unwrap();
        assert_eq!(number.to_decimal(), Some(Decimal::new(455, 1)));

        let numeric_text: FormValue = serde_json::from_str("\"28000\"").unwrap();
        assert_eq!(numeric_text.to_decimal(), Some(Decimal::from(28000)));

        let garbage: FormValue = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(garbage, FormValue::Text("abc".to_string()));
        assert_eq!(garbage.to_decimal(), None);

        let blank: FormValue = serde_json::from_str("\"  \"").unwrap();
        assert!(blank.is_blank());
    }
}
