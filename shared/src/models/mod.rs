//! Domain models for the poultry ledger
//!
//! Three flat collections are kept: preorders, purchases and sales. Every
//! record carries an opaque id and the calendar day it belongs to.

mod preorder;
mod purchase;
mod record;
mod sale;
mod snapshot;

pub use preorder::*;
pub use purchase::*;
pub use record::*;
pub use sale::*;
pub use snapshot::*;

/// Generate a fresh opaque record id
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
