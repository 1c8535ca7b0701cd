//! Pricing Rules
//!
//! A pricing rule discounts one product once enough units of it are bought.
//! Each rule has one of three shapes:
//!
//! - [`DiscountShape::ExactMultiple`]: every complete group of `size` units is
//!   charged at the discounted price, leftover units at the normal price.
//! - [`DiscountShape::Range`]: once `min` units are bought, every unit up to
//!   `max` is charged at the discounted price, units beyond `max` at the
//!   normal price.
//! - [`DiscountShape::MinimumThreshold`]: once `min` units are bought, the
//!   first `min` units are charged at the discounted price and the rest at the
//!   normal price.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a rule definition cannot be turned into a pricing rule.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleError {
    /// None of the discount shapes were set.
    #[error("no discount shape set; expected exact_quantity, min_quantity, or both min_quantity and max_quantity")]
    MissingShape,

    /// More than one discount shape was set.
    #[error("exact_quantity cannot be combined with min_quantity or max_quantity")]
    AmbiguousShape,

    /// A maximum was set without a minimum.
    #[error("max_quantity requires min_quantity")]
    MaxWithoutMin,

    /// A quantity field was zero.
    #[error("{0} must be greater than zero")]
    ZeroQuantity(&'static str),

    /// The range maximum is below its minimum.
    #[error("max_quantity {max} is less than min_quantity {min}")]
    MaxBelowMin {
        /// Range minimum
        min: u32,
        /// Range maximum
        max: u32,
    },

    /// A price was negative.
    #[error("price {0} is negative")]
    NegativePrice(Decimal),
}

/// Loosely shaped rule as written in configuration.
///
/// Every field except the prices is optional; exactly one combination of the
/// quantity fields makes a valid rule. See [`PricingRule::try_from`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDefinition {
    /// Threshold before the discount applies
    pub min_quantity: Option<u32>,

    /// Cap on discounted units
    pub max_quantity: Option<u32>,

    /// Size of a discounted group
    pub exact_quantity: Option<u32>,

    /// Unit price with no discount applied
    pub normal_price: Decimal,

    /// Unit price once the discount condition is met
    pub discounted_price: Decimal,
}

/// The discount structure of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountShape {
    /// Complete groups of `size` units are discounted.
    ExactMultiple {
        /// Group size
        size: u32,
    },

    /// All units are discounted once `min` is reached, up to `max` units.
    Range {
        /// Threshold
        min: u32,
        /// Cap
        max: u32,
    },

    /// The first `min` units are discounted once `min` is reached.
    MinimumThreshold {
        /// Threshold
        min: u32,
    },
}

/// A validated pricing rule for one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRule {
    shape: DiscountShape,
    normal_price: Decimal,
    discounted_price: Decimal,
}

impl PricingRule {
    /// Every complete group of `size` units is charged at `discounted_price` per unit.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if `size` is zero or a price is negative.
    pub fn exact_multiple(
        size: u32,
        normal_price: Decimal,
        discounted_price: Decimal,
    ) -> Result<Self, RuleError> {
        ensure_non_zero("exact_quantity", size)?;

        Self::with_shape(
            DiscountShape::ExactMultiple { size },
            normal_price,
            discounted_price,
        )
    }

    /// Between `min` and `max` units, every unit is charged at `discounted_price`.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if a quantity is zero, `max < min`, or a price is negative.
    pub fn range(
        min: u32,
        max: u32,
        normal_price: Decimal,
        discounted_price: Decimal,
    ) -> Result<Self, RuleError> {
        ensure_non_zero("min_quantity", min)?;
        ensure_non_zero("max_quantity", max)?;

        if max < min {
            return Err(RuleError::MaxBelowMin { min, max });
        }

        Self::with_shape(
            DiscountShape::Range { min, max },
            normal_price,
            discounted_price,
        )
    }

    /// From `min` units on, the first `min` units are charged at `discounted_price`.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if `min` is zero or a price is negative.
    pub fn minimum_threshold(
        min: u32,
        normal_price: Decimal,
        discounted_price: Decimal,
    ) -> Result<Self, RuleError> {
        ensure_non_zero("min_quantity", min)?;

        Self::with_shape(
            DiscountShape::MinimumThreshold { min },
            normal_price,
            discounted_price,
        )
    }

    fn with_shape(
        shape: DiscountShape,
        normal_price: Decimal,
        discounted_price: Decimal,
    ) -> Result<Self, RuleError> {
        for price in [normal_price, discounted_price] {
            if price < Decimal::ZERO {
                return Err(RuleError::NegativePrice(price));
            }
        }

        Ok(Self {
            shape,
            normal_price,
            discounted_price,
        })
    }

    /// Returns the discount shape
    pub fn shape(&self) -> DiscountShape {
        self.shape
    }

    /// Returns the unit price with no discount
    pub fn normal_price(&self) -> Decimal {
        self.normal_price
    }

    /// Returns the discounted unit price
    pub fn discounted_price(&self) -> Decimal {
        self.discounted_price
    }

    /// Price `quantity` units of the product under this rule.
    ///
    /// No rounding is applied. Returns `None` if the amount overflows.
    pub fn price(&self, quantity: u32) -> Option<Decimal> {
        let normal = self.normal_price;
        let discounted = self.discounted_price;

        let (discounted_units, normal_units) = match self.shape {
            DiscountShape::ExactMultiple { size } => {
                let remainder = quantity % size;

                (quantity - remainder, remainder)
            }
            DiscountShape::Range { min, .. } | DiscountShape::MinimumThreshold { min }
                if quantity < min =>
            {
                (0, quantity)
            }
            DiscountShape::Range { max, .. } => (quantity.min(max), quantity.saturating_sub(max)),
            DiscountShape::MinimumThreshold { min } => (min, quantity - min),
        };

        let discounted_amount = line_amount(discounted_units, discounted)?;

        discounted_amount.checked_add(line_amount(normal_units, normal)?)
    }
}

impl TryFrom<RuleDefinition> for PricingRule {
    type Error = RuleError;

    fn try_from(definition: RuleDefinition) -> Result<Self, Self::Error> {
        let RuleDefinition {
            min_quantity,
            max_quantity,
            exact_quantity,
            normal_price,
            discounted_price,
        } = definition;

        match (exact_quantity, min_quantity, max_quantity) {
            (Some(size), None, None) => Self::exact_multiple(size, normal_price, discounted_price),
            (Some(_), _, _) => Err(RuleError::AmbiguousShape),
            (None, Some(min), Some(max)) => Self::range(min, max, normal_price, discounted_price),
            (None, Some(min), None) => {
                Self::minimum_threshold(min, normal_price, discounted_price)
            }
            (None, None, Some(_)) => Err(RuleError::MaxWithoutMin),
            (None, None, None) => Err(RuleError::MissingShape),
        }
    }
}

impl fmt::Display for PricingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let discounted = self.discounted_price.round_dp(2);

        match self.shape {
            DiscountShape::ExactMultiple { size } => {
                write!(f, "groups of {size} at {discounted} each")
            }
            DiscountShape::Range { min, max } => {
                write!(f, "{min} to {max} at {discounted} each")
            }
            DiscountShape::MinimumThreshold { min } => {
                write!(f, "first {min} at {discounted} each")
            }
        }
    }
}

fn units(quantity: u32) -> Decimal {
    Decimal::from(quantity)
}

fn line_amount(quantity: u32, unit_price: Decimal) -> Option<Decimal> {
    units(quantity).checked_mul(unit_price)
}

fn ensure_non_zero(field: &'static str, quantity: u32) -> Result<(), RuleError> {
    if quantity == 0 {
        Err(RuleError::ZeroQuantity(field))
    } else {
        Ok(())
    }
}
