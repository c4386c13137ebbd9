//! Derived-total calculator
//!
//! Purchases and sales never carry an entered total: the amount is always
//! derived from weight and per-kg price through [`compute_total_price`].

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Heaviest weight a single record may carry, in kg
pub const MAX_WEIGHT_KG: i64 = 1_000_000;
/// Highest accepted unit price, in Rupiah per kg
pub const MAX_PRICE_PER_KG: i64 = 1_000_000_000;
/// Decimal places kept for weights (grams)
pub const WEIGHT_SCALE: u32 = 3;
/// Decimal places kept for unit prices (sen)
pub const PRICE_SCALE: u32 = 2;

/// Reasons a derived total cannot be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("weight must be greater than zero")]
    NonPositiveWeight,

    #[error("price per kg must be greater than zero")]
    NonPositivePrice,

    #[error("weight must not exceed 1.000.000 kg")]
    WeightOutOfRange,

    #[error("price per kg must not exceed Rp 1.000.000.000")]
    PriceOutOfRange,

    #[error("weight allows at most 3 decimal places")]
    WeightTooPrecise,

    #[error("price per kg allows at most 2 decimal places")]
    PriceTooPrecise,
}

impl PricingError {
    /// Name of the input field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            PricingError::NonPositiveWeight
            | PricingError::WeightOutOfRange
            | PricingError::WeightTooPrecise => "weight",
            PricingError::NonPositivePrice
            | PricingError::PriceOutOfRange
            | PricingError::PriceTooPrecise => "price_per_kg",
        }
    }
}

/// Check one pricing input against its upper bound and scale.
///
/// Inputs within these limits survive a JSON number round trip unchanged
/// and keep every ledger sum far below the `Decimal` range.
fn check_bounds(
    value: Decimal,
    max: i64,
    scale: u32,
    out_of_range: PricingError,
    too_precise: PricingError,
) -> Result<(), PricingError> {
    if value > Decimal::from(max) {
        return Err(out_of_range);
    }
    if value.normalize().scale() > scale {
        return Err(too_precise);
    }
    Ok(())
}

/// `round(weight * price_per_kg)` to a whole Rupiah, half away from zero
pub fn compute_total_price(weight: Decimal, price_per_kg: Decimal) -> Result<Decimal, PricingError> {
    if weight <= Decimal::ZERO {
        return Err(PricingError::NonPositiveWeight);
    }
    if price_per_kg <= Decimal::ZERO {
        return Err(PricingError::NonPositivePrice);
    }
    check_bounds(
        weight,
        MAX_WEIGHT_KG,
        WEIGHT_SCALE,
        PricingError::WeightOutOfRange,
        PricingError::WeightTooPrecise,
    )?;
    check_bounds(
        price_per_kg,
        MAX_PRICE_PER_KG,
        PRICE_SCALE,
        PricingError::PriceOutOfRange,
        PricingError::PriceTooPrecise,
    )?;

    let product = weight
        .checked_mul(price_per_kg)
        .ok_or(PricingError::PriceOutOfRange)?;

    Ok(product.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}
