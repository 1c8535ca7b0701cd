//! Pricing

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    products::{Catalog, ProductId},
    rules::{PricingRule, RuleDefinition, RuleError},
};

/// Errors that can occur while building a rule table or pricing a product.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    /// A rule definition was rejected when building the table.
    #[error("Invalid rule for product {product}: {reason}")]
    InvalidRule {
        /// Product the rule was defined for
        product: ProductId,
        /// Why the rule was rejected
        reason: RuleError,
    },

    /// The product has no rule and no catalog entry to fall back to.
    #[error("Unknown product {0}")]
    UnknownProduct(ProductId),

    /// The amount for a product is too large to represent.
    #[error("Amount for {quantity} units of product {product} overflows")]
    Overflow {
        /// Product being priced
        product: ProductId,
        /// Units being priced
        quantity: u32,
    },
}

/// Builds a rule definition from a product's normal price.
type DefineRule = fn(Decimal) -> RuleDefinition;

/// Pricing rules keyed by product id.
///
/// Read-only once built; any number of checkouts can share one table.
#[derive(Debug, Clone, Default)]
pub struct PricingRuleTable {
    rules: FxHashMap<ProductId, PricingRule>,
}

impl PricingRuleTable {
    /// Create a table with no rules; every product is charged its normal price.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from already validated rules.
    pub fn with_rules(rules: impl IntoIterator<Item = (ProductId, PricingRule)>) -> Self {
        let rules: FxHashMap<_, _> = rules.into_iter().collect();

        debug!(rules = rules.len(), "built pricing rule table");

        Self { rules }
    }

    /// Create a table from rule definitions, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidRule`] for the first definition that is not a valid rule.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = (ProductId, RuleDefinition)>,
    ) -> Result<Self, PricingError> {
        let rules = definitions
            .into_iter()
            .map(|(product, definition)| match PricingRule::try_from(definition) {
                Ok(rule) => Ok((product, rule)),
                Err(reason) => Err(PricingError::InvalidRule { product, reason }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with_rules(rules))
    }

    /// The built-in store rules, priced from the catalog's normal prices.
    ///
    /// - `1`: the first 5 units are 499.99 each once 5 are bought.
    /// - `3`: buy 3, pay for 2, on every complete group of 3.
    /// - `4`: a third off every unit when buying 3 to 6, full price beyond 6.
    ///
    /// Products missing from the catalog get no rule.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidRule`] if a catalog price makes a rule invalid.
    pub fn default_rules(catalog: &Catalog) -> Result<Self, PricingError> {
        let definitions: [(&str, DefineRule); 3] = [
            ("1", |normal_price| RuleDefinition {
                min_quantity: Some(5),
                normal_price,
                discounted_price: Decimal::new(49999, 2),
                ..RuleDefinition::default()
            }),
            ("3", |normal_price| RuleDefinition {
                exact_quantity: Some(3),
                normal_price,
                discounted_price: two_thirds(normal_price),
                ..RuleDefinition::default()
            }),
            ("4", |normal_price| RuleDefinition {
                min_quantity: Some(3),
                max_quantity: Some(6),
                normal_price,
                discounted_price: two_thirds(normal_price),
                ..RuleDefinition::default()
            }),
        ];

        Self::from_definitions(definitions.into_iter().filter_map(|(id, define)| {
            let id = ProductId::new(id);
            let normal_price = catalog.get(&id)?.price;

            Some((id, define(normal_price)))
        }))
    }

    /// Get the rule for a product, if it has one.
    pub fn get(&self, product: &ProductId) -> Option<&PricingRule> {
        self.rules.get(product)
    }

    /// Iterate over the rules, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &PricingRule)> {
        self.rules.iter()
    }

    /// Number of rules in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Price `quantity` units of a product.
    ///
    /// Uses the product's rule when there is one, otherwise the catalog's normal price.
    ///
    /// # Errors
    ///
    /// - [`PricingError::UnknownProduct`]: the product has neither a rule nor a catalog entry.
    /// - [`PricingError::Overflow`]: the amount is too large to represent.
    pub fn price(
        &self,
        catalog: &Catalog,
        product: &ProductId,
        quantity: u32,
    ) -> Result<Decimal, PricingError> {
        let price = match self.rules.get(product) {
            Some(rule) => rule.price(quantity),
            None => {
                let normal = catalog
                    .get(product)
                    .ok_or_else(|| PricingError::UnknownProduct(product.clone()))?;

                Decimal::from(quantity).checked_mul(normal.price)
            }
        };

        price.ok_or_else(|| PricingError::Overflow {
            product: product.clone(),
            quantity,
        })
    }
}

fn two_thirds(price: Decimal) -> Decimal {
    price * Decimal::from(2) / Decimal::from(3)
}
