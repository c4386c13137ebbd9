//! HTTP request handlers

pub mod admin;
pub mod dashboard;
pub mod health;
pub mod pricing;
pub mod records;
pub mod reporting;

pub use admin::*;
pub use dashboard::*;
pub use health::*;
pub use pricing::*;
pub use records::*;
pub use reporting::*;
