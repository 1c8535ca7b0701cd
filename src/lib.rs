//! Till
//!
//! Till prices a checkout of scanned items against per-product bulk discount
//! rules: exact multiples, capped ranges and minimum thresholds.

pub mod checkout;
pub mod config;
pub mod fixtures;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod rules;
