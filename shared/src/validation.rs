//! Form validation for record creation
//!
//! Every check runs before anything is persisted. All failing fields are
//! collected so the caller can report them together.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{LedgerSnapshot, Preorder, Purchase, Sale};
use crate::pricing::{compute_total_price, PricingError};
use crate::types::{DateRange, FormValue};

/// Longest range accepted by reports
pub const MAX_REPORT_DAYS: i64 = 366;

// ============================================================================
// Errors
// ============================================================================

/// What is wrong with a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldIssue {
    Missing,
    NotNumeric,
    NotInteger,
    NotPositive,
    OutOfRange,
    /// More decimal places than the field keeps
    TooPrecise,
    InvalidDate,
    /// Sale entry while no preorder exists for the day
    NoEligibleCustomer,
    /// Sale customer without a preorder on the day
    NotEligible,
    /// Stored total differs from `round(weight × price_per_kg)`
    TotalMismatch,
    DuplicateId,
}

impl FieldIssue {
    pub fn message_en(&self) -> &'static str {
        match self {
            FieldIssue::Missing => "is required",
            FieldIssue::NotNumeric => "must be a number",
            FieldIssue::NotInteger => "must be a whole number",
            FieldIssue::NotPositive => "must be greater than zero",
            FieldIssue::OutOfRange => "is out of range",
            FieldIssue::TooPrecise => "has too many decimal places",
            FieldIssue::InvalidDate => "must be a date in YYYY-MM-DD format",
            FieldIssue::NoEligibleCustomer => "has no preorder customers for this date",
            FieldIssue::NotEligible => "has no preorder on this date",
            FieldIssue::TotalMismatch => "does not equal weight times price per kg",
            FieldIssue::DuplicateId => "is used by another record",
        }
    }

    pub fn message_id(&self) -> &'static str {
        match self {
            FieldIssue::Missing => "wajib diisi",
            FieldIssue::NotNumeric => "harus berupa angka",
            FieldIssue::NotInteger => "harus berupa bilangan bulat",
            FieldIssue::NotPositive => "harus lebih dari nol",
            FieldIssue::OutOfRange => "di luar batas",
            FieldIssue::TooPrecise => "terlalu banyak angka desimal",
            FieldIssue::InvalidDate => "harus berupa tanggal dengan format YYYY-MM-DD",
            FieldIssue::NoEligibleCustomer => "belum ada pelanggan preorder untuk tanggal ini",
            FieldIssue::NotEligible => "tidak memiliki preorder pada tanggal ini",
            FieldIssue::TotalMismatch => "tidak sama dengan berat dikali harga per kg",
            FieldIssue::DuplicateId => "sudah dipakai oleh data lain",
        }
    }
}

/// A failing field and the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub issue: FieldIssue,
}

impl FieldError {
    pub fn new(field: impl Into<String>, issue: FieldIssue) -> Self {
        Self {
            field: field.into(),
            issue,
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.issue.message_en())
    }
}

/// One or more failing fields
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid input: {}", describe(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, issue: FieldIssue) -> Self {
        Self(vec![FieldError::new(field, issue)])
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn has(&self, field: &str, issue: FieldIssue) -> bool {
        self.0.iter().any(|e| e.field == field && e.issue == issue)
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl From<PricingError> for FieldIssue {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::NonPositiveWeight | PricingError::NonPositivePrice => {
                FieldIssue::NotPositive
            }
            PricingError::WeightOutOfRange | PricingError::PriceOutOfRange => FieldIssue::OutOfRange,
            PricingError::WeightTooPrecise | PricingError::PriceTooPrecise => FieldIssue::TooPrecise,
        }
    }
}

impl From<PricingError> for ValidationErrors {
    fn from(error: PricingError) -> Self {
        Self::single(error.field(), error.into())
    }
}

/// Collects per-field results, keeping the first issue of each field
#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn take<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_error(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }
}

// ============================================================================
// Field parsers
// ============================================================================

/// Parse a `YYYY-MM-DD` entry date, falling back to `today` when absent
pub fn parse_entry_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, FieldError> {
    match value.map(str::trim) {
        None | Some("") => Ok(today),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| FieldError::new("date", FieldIssue::InvalidDate)),
    }
}

/// Strictly positive decimal
pub fn positive_decimal(field: &str, value: Option<&FormValue>) -> Result<Decimal, FieldError> {
    let value = match value {
        Some(v) if !v.is_blank() => v,
        _ => return Err(FieldError::new(field, FieldIssue::Missing)),
    };

    let number = value
        .to_decimal()
        .ok_or_else(|| FieldError::new(field, FieldIssue::NotNumeric))?;

    if number <= Decimal::ZERO {
        return Err(FieldError::new(field, FieldIssue::NotPositive));
    }
    Ok(number)
}

/// Strictly positive whole number
pub fn positive_integer(field: &str, value: Option<&FormValue>) -> Result<u32, FieldError> {
    let number = positive_decimal(field, value)?;

    if !number.fract().is_zero() {
        return Err(FieldError::new(field, FieldIssue::NotInteger));
    }

    number
        .to_u32()
        .ok_or_else(|| FieldError::new(field, FieldIssue::OutOfRange))
}

/// Trimmed, non-empty text
pub fn required_text(field: &str, value: Option<&str>) -> Result<String, FieldError> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(FieldError::new(field, FieldIssue::Missing)),
    }
}

/// Validate a report range: start before end and at most [`MAX_REPORT_DAYS`]
pub fn validate_date_range(range: &DateRange) -> Result<(), ValidationErrors> {
    if range.start > range.end {
        return Err(ValidationErrors::single("start_date", FieldIssue::OutOfRange));
    }
    if range.len_days() > MAX_REPORT_DAYS {
        return Err(ValidationErrors::single("end_date", FieldIssue::OutOfRange));
    }
    Ok(())
}

// ============================================================================
// Forms
// ============================================================================

/// Preorder entry form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreorderForm {
    pub date: Option<String>,
    pub customer_name: Option<String>,
    pub quantity: Option<FormValue>,
}

impl PreorderForm {
    pub fn validate(&self, today: NaiveDate) -> Result<Preorder, ValidationErrors> {
        let mut c = Collector::default();

        let date = c.take(parse_entry_date(self.date.as_deref(), today));
        let customer_name = c.take(required_text("customer_name", self.customer_name.as_deref()));
        let quantity = c.take(positive_integer("quantity", self.quantity.as_ref()));

        match (date, customer_name, quantity) {
            (Some(date), Some(name), Some(quantity)) if c.is_clean() => {
                Ok(Preorder::new(date, name, quantity))
            }
            _ => Err(c.into_error()),
        }
    }
}

/// Purchase entry form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseForm {
    pub date: Option<String>,
    pub quantity: Option<FormValue>,
    pub weight: Option<FormValue>,
    pub price_per_kg: Option<FormValue>,
}

impl PurchaseForm {
    pub fn validate(&self, today: NaiveDate) -> Result<Purchase, ValidationErrors> {
        let mut c = Collector::default();

        let date = c.take(parse_entry_date(self.date.as_deref(), today));
        let quantity = c.take(positive_integer("quantity", self.quantity.as_ref()));
        let weight = c.take(positive_decimal("weight", self.weight.as_ref()));
        let price = c.take(positive_decimal("price_per_kg", self.price_per_kg.as_ref()));

        match (date, quantity, weight, price) {
            (Some(date), Some(quantity), Some(weight), Some(price)) if c.is_clean() => {
                Ok(Purchase::new(date, quantity, weight, price)?)
            }
            _ => Err(c.into_error()),
        }
    }
}

/// Sale entry form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleForm {
    pub date: Option<String>,
    pub customer_name: Option<String>,
    pub quantity: Option<FormValue>,
    pub weight: Option<FormValue>,
    pub price_per_kg: Option<FormValue>,
}

impl SaleForm {
    /// Date the sale is recorded for; needed to resolve eligible customers
    pub fn entry_date(&self, today: NaiveDate) -> Result<NaiveDate, ValidationErrors> {
        parse_entry_date(self.date.as_deref(), today).map_err(ValidationErrors::from)
    }

    /// Validate against the customers eligible on the entry date.
    ///
    /// An empty `available` list closes sale entry outright.
    pub fn validate(&self, today: NaiveDate, available: &[String]) -> Result<Sale, ValidationErrors> {
        let mut c = Collector::default();

        let date = c.take(parse_entry_date(self.date.as_deref(), today));
        let customer_name = c.take(if available.is_empty() {
            Err(FieldError::new("customer_name", FieldIssue::NoEligibleCustomer))
        } else {
            required_text("customer_name", self.customer_name.as_deref()).and_then(|name| {
                if available.iter().any(|a| a == &name) {
                    Ok(name)
                } else {
                    Err(FieldError::new("customer_name", FieldIssue::NotEligible))
                }
            })
        });
        let quantity = c.take(positive_integer("quantity", self.quantity.as_ref()));
        let weight = c.take(positive_decimal("weight", self.weight.as_ref()));
        let price = c.take(positive_decimal("price_per_kg", self.price_per_kg.as_ref()));

        match (date, customer_name, quantity, weight, price) {
            (Some(date), Some(name), Some(quantity), Some(weight), Some(price)) if c.is_clean() => {
                Ok(Sale::new(date, name, quantity, weight, price)?)
            }
            _ => Err(c.into_error()),
        }
    }
}

/// Derived-total preview form (weight and unit price only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricePreviewForm {
    pub weight: Option<FormValue>,
    pub price_per_kg: Option<FormValue>,
}

impl PricePreviewForm {
    pub fn validate(&self) -> Result<Decimal, ValidationErrors> {
        let mut c = Collector::default();

        let weight = c.take(positive_decimal("weight", self.weight.as_ref()));
        let price = c.take(positive_decimal("price_per_kg", self.price_per_kg.as_ref()));

        match (weight, price) {
            (Some(weight), Some(price)) if c.is_clean() => Ok(compute_total_price(weight, price)?),
            _ => Err(c.into_error()),
        }
    }
}

// ============================================================================
// Bulk import
// ============================================================================

/// Check an imported snapshot record by record.
///
/// Field names are prefixed with the record position, e.g.
/// `sales[3].total_price`.
pub fn validate_import(snapshot: &LedgerSnapshot) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    let mut check_ids = |collection: &str, ids: Vec<&str>| {
        let mut seen = std::collections::HashSet::new();
        for (i, id) in ids.into_iter().enumerate() {
            if id.trim().is_empty() {
                errors.push(FieldError::new(format!("{}[{}].id", collection, i), FieldIssue::Missing));
            } else if !seen.insert(id) {
                errors.push(FieldError::new(format!("{}[{}].id", collection, i), FieldIssue::DuplicateId));
            }
        }
    };
    check_ids("preorders", snapshot.preorders.iter().map(|r| r.id.as_str()).collect());
    check_ids("purchases", snapshot.purchases.iter().map(|r| r.id.as_str()).collect());
    check_ids("sales", snapshot.sales.iter().map(|r| r.id.as_str()).collect());

    for (i, p) in snapshot.preorders.iter().enumerate() {
        let at = |field: &str| format!("preorders[{}].{}", i, field);
        if p.customer_name.trim().is_empty() {
            errors.push(FieldError::new(at("customer_name"), FieldIssue::Missing));
        }
        if p.quantity == 0 {
            errors.push(FieldError::new(at("quantity"), FieldIssue::NotPositive));
        }
    }

    for (i, s) in snapshot.sales.iter().enumerate() {
        if s.customer_name.trim().is_empty() {
            errors.push(FieldError::new(format!("sales[{}].customer_name", i), FieldIssue::Missing));
        }
    }

    let mut check_priced = |collection: &str,
                            i: usize,
                            quantity: u32,
                            weight: Decimal,
                            price: Decimal,
                            total: Decimal| {
        let at = |field: &str| format!("{}[{}].{}", collection, i, field);
        if quantity == 0 {
            errors.push(FieldError::new(at("quantity"), FieldIssue::NotPositive));
        }
        match compute_total_price(weight, price) {
            Ok(expected) if expected == total => {}
            Ok(_) => errors.push(FieldError::new(at("total_price"), FieldIssue::TotalMismatch)),
            Err(e) => errors.push(FieldError::new(at(e.field()), e.into())),
        }
    };
    for (i, p) in snapshot.purchases.iter().enumerate() {
        check_priced("purchases", i, p.quantity, p.weight, p.price_per_kg, p.total_price);
    }
    for (i, s) in snapshot.sales.iter().enumerate() {
        check_priced("sales", i, s.quantity, s.weight, s.price_per_kg, s.total_price);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
