//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    checkout::{Checkout, CheckoutError},
    pricing::PricingError,
    products::ProductId,
    rules::PricingRule,
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error pricing a scanned product.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Error totalling the checkout.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// An amount cannot be represented in minor currency units.
    #[error("Amount {0} is out of range for display")]
    AmountOutOfRange(Decimal),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One receipt line per distinct product.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Product id
    pub product: ProductId,

    /// Product name, or the product id when the catalog has no entry
    pub name: String,

    /// Units bought
    pub quantity: u32,

    /// Normal unit price
    pub unit_price: Decimal,

    /// Quantity at the normal unit price
    pub full_price: Decimal,

    /// Amount charged after the product's rule
    pub price: Decimal,

    /// Rule applied, if the product has one
    pub rule: Option<PricingRule>,
}

impl ReceiptLine {
    /// Amount saved on this line
    pub fn savings(&self) -> Decimal {
        self.full_price - self.price
    }
}

/// Itemised breakdown of a checkout.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Lines ordered by product id
    lines: SmallVec<[ReceiptLine; 4]>,

    /// Total cost before any rules
    subtotal: Decimal,

    /// Total amount owed after rules
    total: Decimal,

    /// Currency used for display
    currency: &'static Currency,
}

impl Receipt {
    /// Build a receipt for everything scanned so far.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a scanned product cannot be priced or an
    /// amount overflows.
    pub fn from_checkout(checkout: &Checkout<'_>) -> Result<Self, ReceiptError> {
        let catalog = checkout.catalog();
        let rules = checkout.rules();
        let total = checkout.total()?;

        let lines = checkout
            .quantities()
            .into_iter()
            .map(|(product, quantity)| {
                let price = rules.price(catalog, product, quantity)?;
                let rule = rules.get(product).copied();
                let entry = catalog.get(product);

                let unit_price = match (rule, entry) {
                    (Some(rule), _) => rule.normal_price(),
                    (None, Some(entry)) => entry.price,
                    (None, None) => return Err(PricingError::UnknownProduct(product.clone())),
                };

                let full_price = Decimal::from(quantity)
                    .checked_mul(unit_price)
                    .ok_or_else(|| overflow(product, quantity))?;

                Ok(ReceiptLine {
                    product: product.clone(),
                    name: entry.map_or_else(|| product.to_string(), |entry| entry.name.clone()),
                    quantity,
                    unit_price,
                    full_price,
                    price,
                    rule,
                })
            })
            .collect::<Result<SmallVec<[ReceiptLine; 4]>, PricingError>>()?;

        let subtotal = lines.iter().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(line.full_price)
                .ok_or_else(|| overflow(&line.product, line.quantity))
        })?;

        Ok(Receipt {
            lines,
            subtotal,
            total,
            currency: catalog.currency(),
        })
    }

    /// Receipt lines, ordered by product id
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Total cost before any rules
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Total amount owed
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Amount saved by the pricing rules
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.subtotal - self.total
    }

    /// Savings as a fraction of the subtotal
    #[must_use]
    pub fn savings_percent(&self) -> Percentage {
        if self.subtotal.is_zero() {
            return Percentage::from(Decimal::ZERO);
        }

        Percentage::from(self.savings() / self.subtotal)
    }

    /// Currency used for display
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Prints the receipt as a table followed by a summary.
    ///
    /// Amounts are rounded to minor currency units here and nowhere else.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be displayed or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "Item",
            "Qty",
            "Unit Price",
            "Full Price",
            "Price",
            "Savings",
            "Rule",
        ]);

        for line in &self.lines {
            let savings = line.savings();

            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                self.display(line.unit_price)?,
                self.display(line.full_price)?,
                self.display(line.price)?,
                if savings.is_zero() {
                    String::new()
                } else {
                    format!("-{}", self.display(savings)?)
                },
                line.rule.map(|rule| rule.to_string()).unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..6), Alignment::right());

        writeln!(out, "\n{table}")?;

        let percent_points =
            ((self.savings_percent() * Decimal::ONE) * Decimal::from(100)).round_dp(2);

        let summary = [
            (" Subtotal:", self.display(self.subtotal)?),
            (" Total:", self.display(self.total)?),
            (
                " Savings:",
                format!("({percent_points}%) {}", self.display(self.savings())?),
            ),
        ];

        let value_width = summary
            .iter()
            .map(|(_, value)| value.len())
            .max()
            .unwrap_or_default();

        for (label, value) in summary {
            writeln!(out, "{label:<11}{value:>value_width$}")?;
        }

        writeln!(out)?;

        Ok(())
    }

    fn display(&self, amount: Decimal) -> Result<String, ReceiptError> {
        Ok(to_money(amount, self.currency)?.to_string())
    }
}

fn overflow(product: &ProductId, quantity: u32) -> PricingError {
    PricingError::Overflow {
        product: product.clone(),
        quantity,
    }
}

/// Round an amount to minor units and wrap it as money for display.
///
/// # Errors
///
/// Returns [`ReceiptError::AmountOutOfRange`] if the amount does not fit in minor units.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, ReceiptError> {
    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(ReceiptError::AmountOutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency))
}
