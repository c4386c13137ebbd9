//! Sale models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{compute_total_price, PricingError};

/// An outbound transaction to a preordering customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Name of a customer with a preorder on the same day
    pub customer_name: String,
    pub quantity: u32,
    #[serde(with = "crate::decimal_json")]
    pub weight: Decimal,
    #[serde(with = "crate::decimal_json")]
    pub price_per_kg: Decimal,
    #[serde(with = "crate::decimal_json")]
    pub total_price: Decimal,
    pub date: NaiveDate,
}

impl Sale {
    /// Build a sale, deriving `total_price` exactly as [`super::Purchase::new`] does
    pub fn new(
        date: NaiveDate,
        customer_name: impl Into<String>,
        quantity: u32,
        weight: Decimal,
        price_per_kg: Decimal,
    ) -> Result<Self, PricingError> {
        let total_price = compute_total_price(weight, price_per_kg)?;
        Ok(Self {
            id: super::new_record_id(),
            customer_name: customer_name.into(),
            quantity,
            weight,
            price_per_kg,
            total_price,
            date,
        })
    }
}
