//! Checkout

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, debug_span};

use crate::{
    pricing::{PricingError, PricingRuleTable},
    products::{Catalog, ProductId},
    receipt::{Receipt, ReceiptError},
};

/// Errors related to scanning or totalling a checkout.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckoutError {
    /// The scanned item code is not in the catalog.
    #[error("Invalid item {0}")]
    InvalidItem(String),

    /// A scanned product could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A single shopping session.
///
/// Holds the scanned products in arrival order and prices them against a
/// shared catalog and rule table.
#[derive(Debug, Clone)]
pub struct Checkout<'a> {
    catalog: &'a Catalog,
    rules: &'a PricingRuleTable,
    scans: Vec<ProductId>,
}

impl<'a> Checkout<'a> {
    /// Create an empty checkout bound to a catalog and rule table.
    #[must_use]
    pub fn new(catalog: &'a Catalog, rules: &'a PricingRuleTable) -> Self {
        Checkout {
            catalog,
            rules,
            scans: Vec::new(),
        }
    }

    /// Scan an item by its item code.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidItem`] if the code is not in the catalog.
    /// Nothing is recorded in that case.
    pub fn scan(&mut self, item_code: &str) -> Result<(), CheckoutError> {
        let product = self
            .catalog
            .product_id(item_code)
            .ok_or_else(|| CheckoutError::InvalidItem(item_code.to_string()))?;

        debug!(item_code, product = %product, "scanned item");

        self.scans.push(product.clone());

        Ok(())
    }

    /// Scan every item code in order, stopping at the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidItem`] for the first unknown code.
    /// Items before it stay scanned.
    pub fn scan_all<'c>(
        &mut self,
        item_codes: impl IntoIterator<Item = &'c str>,
    ) -> Result<(), CheckoutError> {
        item_codes
            .into_iter()
            .try_for_each(|item_code| self.scan(item_code))
    }

    /// Count the scanned units of each product, ordered by product id.
    pub fn quantities(&self) -> Vec<(&ProductId, u32)> {
        let mut counts: FxHashMap<&ProductId, u32> = FxHashMap::default();

        for product in &self.scans {
            *counts.entry(product).or_default() += 1;
        }

        let mut quantities: Vec<_> = counts.into_iter().collect();
        quantities.sort_unstable_by_key(|(product, _)| *product);

        quantities
    }

    /// Calculate the total owed for everything scanned so far.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Pricing`] if a scanned product cannot be priced
    /// or the total overflows.
    pub fn total(&self) -> Result<Decimal, CheckoutError> {
        let _span = debug_span!("total", scans = self.scans.len()).entered();

        let total = self
            .quantities()
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, (product, quantity)| {
                let price = self.rules.price(self.catalog, product, quantity)?;

                debug!(product = %product, quantity, %price, "priced product");

                acc.checked_add(price).ok_or_else(|| PricingError::Overflow {
                    product: product.clone(),
                    quantity,
                })
            })?;

        debug!(%total, "calculated total");

        Ok(total)
    }

    /// Build an itemised receipt for everything scanned so far.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a scanned product cannot be priced.
    pub fn receipt(&self) -> Result<Receipt, ReceiptError> {
        Receipt::from_checkout(self)
    }

    /// Iterate over the scanned products in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.scans.iter()
    }

    /// Get the number of scanned items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// Check if nothing has been scanned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// The catalog this checkout scans against.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// The rule table this checkout prices with.
    #[must_use]
    pub fn rules(&self) -> &'a PricingRuleTable {
        self.rules
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::AUD;
    use testresult::TestResult;

    use crate::products::Product;

    use super::*;

    fn defaults() -> Result<(Catalog, PricingRuleTable), PricingError> {
        let catalog = Catalog::default_catalog();
        let rules = PricingRuleTable::default_rules(&catalog)?;

        Ok((catalog, rules))
    }

    #[test]
    fn empty_checkout_totals_zero() -> TestResult {
        let (catalog, rules) = defaults()?;
        let checkout = Checkout::new(&catalog, &rules);

        assert!(checkout.is_empty());
        assert_eq!(checkout.total()?, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn scan_records_product_ids_in_order() -> TestResult {
        let (catalog, rules) = defaults()?;
        let mut checkout = Checkout::new(&catalog, &rules);

        checkout.scan_all(["vga", "ipd", "vga"])?;

        let scanned: Vec<&str> = checkout.iter().map(ProductId::as_str).collect();

        assert_eq!(scanned, vec!["4", "1", "4"]);
        assert_eq!(checkout.len(), 3);

        Ok(())
    }

    #[test]
    fn scan_unknown_item_errors_without_recording() -> TestResult {
        let (catalog, rules) = defaults()?;
        let mut checkout = Checkout::new(&catalog, &rules);

        checkout.scan("atv")?;

        assert_eq!(
            checkout.scan("abc"),
            Err(CheckoutError::InvalidItem("abc".to_string()))
        );
        assert_eq!(checkout.len(), 1);

        Ok(())
    }

    #[test]
    fn scan_all_stops_at_first_invalid_item() -> TestResult {
        let (catalog, rules) = defaults()?;
        let mut checkout = Checkout::new(&catalog, &rules);

        let result = checkout.scan_all(["atv", "nope", "vga"]);

        assert_eq!(result, Err(CheckoutError::InvalidItem("nope".to_string())));
        assert_eq!(checkout.len(), 1);

        Ok(())
    }

    #[test]
    fn quantities_are_grouped_and_sorted() -> TestResult {
        let (catalog, rules) = defaults()?;
        let mut checkout = Checkout::new(&catalog, &rules);

        checkout.scan_all(["vga", "atv", "vga", "ipd", "atv", "vga"])?;

        let quantities: Vec<(&str, u32)> = checkout
            .quantities()
            .into_iter()
            .map(|(product, quantity)| (product.as_str(), quantity))
            .collect();

        assert_eq!(quantities, vec![("1", 1), ("3", 2), ("4", 3)]);

        Ok(())
    }

    #[test]
    fn total_applies_rules_per_product() -> TestResult {
        let (catalog, rules) = defaults()?;
        let mut checkout = Checkout::new(&catalog, &rules);

        checkout.scan_all(["atv", "atv", "atv", "vga"])?;

        assert_eq!(checkout.total()?, Decimal::new(24900, 2));

        Ok(())
    }

    #[test]
    fn total_is_idempotent_and_tracks_new_scans() -> TestResult {
        let (catalog, rules) = defaults()?;
        let mut checkout = Checkout::new(&catalog, &rules);

        checkout.scan_all(["vga", "vga"])?;

        let first = checkout.total()?;
        let second = checkout.total()?;

        assert_eq!(first, second);
        assert_eq!(first, Decimal::new(6000, 2));

        checkout.scan("vga")?;

        assert_eq!(checkout.total()?, Decimal::new(6000, 2));

        checkout.scan("mbp")?;

        assert_eq!(checkout.total()?, Decimal::new(145999, 2));

        Ok(())
    }

    #[test]
    fn total_overflow_is_an_error() -> TestResult {
        let mut catalog = Catalog::new(AUD);
        catalog.insert(ProductId::from("big"), Product::new("big", Decimal::MAX))?;
        catalog.insert(ProductId::from("one"), Product::new("one", Decimal::ONE))?;

        let rules = PricingRuleTable::new();
        let mut checkout = Checkout::new(&catalog, &rules);

        checkout.scan_all(["big", "big"])?;

        assert_eq!(
            checkout.total(),
            Err(CheckoutError::Pricing(PricingError::Overflow {
                product: ProductId::from("big"),
                quantity: 2,
            }))
        );

        let mut checkout = Checkout::new(&catalog, &rules);
        checkout.scan_all(["big", "one"])?;

        assert_eq!(
            checkout.total(),
            Err(CheckoutError::Pricing(PricingError::Overflow {
                product: ProductId::from("one"),
                quantity: 1,
            }))
        );

        Ok(())
    }

    #[test]
    fn total_errors_when_catalog_lacks_scanned_product() -> TestResult {
        let (catalog, rules) = defaults()?;
        let empty_rules = PricingRuleTable::new();

        let mut checkout = Checkout::new(&catalog, &empty_rules);
        checkout.scan("ipd")?;

        assert_eq!(checkout.total()?, Decimal::new(54999, 2));

        let other_catalog = Catalog::new(catalog.currency());
        let stale = Checkout {
            catalog: &other_catalog,
            rules: &rules,
            scans: vec![ProductId::from("2")],
        };

        assert_eq!(
            stale.total(),
            Err(CheckoutError::Pricing(PricingError::UnknownProduct(
                ProductId::from("2")
            )))
        );

        Ok(())
    }
}
