//! Rule Fixtures

use std::str::FromStr;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, products::parse_amount},
    products::Product,
    rules::RuleDefinition,
};

/// Wrapper for pricing rules in YAML
#[derive(Debug, Deserialize)]
pub struct RulesFixture {
    /// Map of product id -> rule fixture
    pub rules: FxHashMap<String, RuleFixture>,
}

/// Rule fixture from YAML
///
/// The quantity fields pick the discount shape. The discounted price is given
/// either directly or as a fraction of the normal price.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFixture {
    /// Threshold before the discount applies
    pub min_quantity: Option<u32>,

    /// Cap on discounted units
    pub max_quantity: Option<u32>,

    /// Size of a discounted group
    pub exact_quantity: Option<u32>,

    /// Normal unit price (e.g., "30.00"); defaults to the catalog price
    pub normal_price: Option<String>,

    /// Discounted unit price (e.g., "499.99")
    pub discounted_price: Option<String>,

    /// Discounted unit price as a fraction of the normal price (e.g., "2/3")
    pub discounted_fraction: Option<String>,
}

impl RuleFixture {
    /// Convert to a `RuleDefinition`, pricing it from the catalog product.
    ///
    /// # Errors
    ///
    /// Returns an error if a price or fraction cannot be parsed, or if both or
    /// neither discounted price forms are set.
    pub fn try_into_definition(
        self,
        product_id: &str,
        product: &Product,
    ) -> Result<RuleDefinition, FixtureError> {
        let normal_price = match &self.normal_price {
            Some(price) => parse_amount(price)?,
            None => product.price,
        };

        let discounted_price = match (&self.discounted_price, &self.discounted_fraction) {
            (Some(price), None) => parse_amount(price)?,
            (None, Some(fraction)) => apply_fraction(normal_price, fraction)?,
            (Some(_), Some(_)) => {
                return Err(FixtureError::InvalidRuleData(format!(
                    "rule for {product_id} sets both discounted_price and discounted_fraction"
                )));
            }
            (None, None) => {
                return Err(FixtureError::InvalidRuleData(format!(
                    "rule for {product_id} needs discounted_price or discounted_fraction"
                )));
            }
        };

        Ok(RuleDefinition {
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            exact_quantity: self.exact_quantity,
            normal_price,
            discounted_price,
        })
    }
}

/// Parse a fraction string (e.g., "2/3" or "0.5") into its numerator and denominator
///
/// A plain decimal has a denominator of one.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidFraction`] if either side is not a
/// non-negative decimal or the denominator is zero.
pub fn parse_fraction(s: &str) -> Result<(Decimal, Decimal), FixtureError> {
    let invalid = || FixtureError::InvalidFraction(s.to_string());

    let parse = |part: &str| {
        Decimal::from_str(part.trim())
            .ok()
            .filter(|value| *value >= Decimal::ZERO)
            .ok_or_else(invalid)
    };

    match s.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = parse(numerator)?;
            let denominator = parse(denominator)?;

            if denominator.is_zero() {
                return Err(invalid());
            }

            Ok((numerator, denominator))
        }
        None => Ok((parse(s)?, Decimal::ONE)),
    }
}

/// Scale a price by a fraction string, multiplying before dividing
///
/// # Errors
///
/// Returns [`FixtureError::InvalidFraction`] if the fraction cannot be parsed
/// or the result overflows.
pub fn apply_fraction(price: Decimal, fraction: &str) -> Result<Decimal, FixtureError> {
    let (numerator, denominator) = parse_fraction(fraction)?;

    price
        .checked_mul(numerator)
        .and_then(|scaled| scaled.checked_div(denominator))
        .ok_or_else(|| FixtureError::InvalidFraction(fraction.to_string()))
}
