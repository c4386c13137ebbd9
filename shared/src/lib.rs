//! Shared types and ledger logic for the poultry trading ledger
//!
//! Everything in this crate is pure: the backend, the WASM client module
//! and tests all use the same derivation and aggregation rules.

pub mod currency;
pub mod customers;
pub mod decimal_json;
pub mod ledger;
pub mod models;
pub mod pricing;
pub mod types;
pub mod validation;

pub use currency::*;
pub use customers::*;
pub use ledger::*;
pub use models::*;
pub use pricing::*;
pub use types::*;
pub use validation::*;
