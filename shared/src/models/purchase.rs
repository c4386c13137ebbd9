//! Purchase models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{compute_total_price, PricingError};

/// An inbound stock acquisition recorded by weight and per-kg price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    /// Number of birds (ekor)
    pub quantity: u32,
    /// Total weight in kg
    #[serde(with = "crate::decimal_json")]
    pub weight: Decimal,
    #[serde(with = "crate::decimal_json")]
    pub price_per_kg: Decimal,
    /// Derived: round(weight * price_per_kg)
    #[serde(with = "crate::decimal_json")]
    pub total_price: Decimal,
    pub date: NaiveDate,
}

impl Purchase {
    /// Build a purchase, deriving `total_price` from weight and unit price
    pub fn new(
        date: NaiveDate,
        quantity: u32,
        weight: Decimal,
        price_per_kg: Decimal,
    ) -> Result<Self, PricingError> {
        let total_price = compute_total_price(weight, price_per_kg)?;
        Ok(Self {
            id: super::new_record_id(),
            quantity,
            weight,
            price_per_kg,
            total_price,
            date,
        })
    }
}
