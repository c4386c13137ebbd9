//! Preorder models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A customer's advance request for a number of birds on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preorder {
    pub id: String,
    pub customer_name: String,
    /// Number of birds (ekor)
    pub quantity: u32,
    pub date: NaiveDate,
}

impl Preorder {
    /// Build a preorder with a freshly generated id.
    ///
    /// Callers are expected to have validated the inputs already; see
    /// [`crate::validation::PreorderForm`].
    pub fn new(date: NaiveDate, customer_name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: super::new_record_id(),
            customer_name: customer_name.into(),
            quantity,
            date,
        }
    }
}
