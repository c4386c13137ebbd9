//! Decimals as plain JSON numbers
//!
//! Use with `#[serde(with = "shared::decimal_json")]`. Values with up to 15
//! significant digits survive a write/read cycle unchanged.

use rust_decimal::Decimal;
use serde::{ser::Error as _, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    // Parsing the decimal text rounds correctly; `to_f64` can be one ulp off
    let number: f64 = value.to_string().parse().map_err(S::Error::custom)?;
    serializer.serialize_f64(number)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    rust_decimal::serde::float::deserialize(deserializer)
}
