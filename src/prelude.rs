//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    checkout::{Checkout, CheckoutError},
    fixtures::{Fixture, FixtureError},
    pricing::{PricingError, PricingRuleTable},
    products::{Catalog, CatalogError, Product, ProductId},
    receipt::{Receipt, ReceiptError, ReceiptLine},
    rules::{DiscountShape, PricingRule, RuleDefinition, RuleError},
};
