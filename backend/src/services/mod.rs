//! Business logic services for the poultry ledger

pub mod ledger;
pub mod reporting;

pub use ledger::{CommandOutcome, DayEntries, LedgerService, PricePreview, Today};
