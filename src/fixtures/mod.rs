//! Fixtures
//!
//! Catalogs, pricing rules and scanned item lists loaded from YAML files
//! laid out as `<base>/{products,rules,items}/<name>.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{
    checkout::{Checkout, CheckoutError},
    fixtures::{items::ItemsFixture, products::ProductsFixture, rules::RulesFixture},
    pricing::{PricingError, PricingRuleTable},
    products::{Catalog, CatalogError, ProductId},
};

pub mod items;
pub mod products;
pub mod rules;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid fraction format
    #[error("Invalid fraction format: {0}")]
    InvalidFraction(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Invalid rule data
    #[error("Invalid rule data: {0}")]
    InvalidRuleData(String),

    /// No products loaded yet
    #[error("No products loaded yet; load a catalog first")]
    NoProducts,

    /// Not enough items in fixture
    #[error("Not enough items in fixture, available: {available}, requested: {requested}")]
    NotEnoughItems {
        /// Number of items defined in the fixture
        available: usize,
        /// Number of items requested
        requested: usize,
    },

    /// Catalog construction error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Rule table construction error
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Item scanning error
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog loaded from the products fixture
    catalog: Option<Catalog>,

    /// Rules loaded from the rules fixture
    rules: PricingRuleTable,

    /// Item codes loaded from the items fixture, in scan order
    items: Vec<String>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            rules: PricingRuleTable::new(),
            items: Vec::new(),
        }
    }

    /// Create a fixture holding the built-in catalog and rules, loading any
    /// further fixture files from `base_path`
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in rules cannot be priced from the catalog.
    pub fn with_defaults(base_path: impl Into<PathBuf>) -> Result<Self, FixtureError> {
        let catalog = Catalog::default_catalog();
        let rules = PricingRuleTable::default_rules(&catalog)?;

        Ok(Self {
            catalog: Some(catalog),
            rules,
            ..Self::with_base_path(base_path)
        })
    }

    /// Load products from a YAML fixture file into the catalog
    ///
    /// The catalog is left unchanged unless every product in the file loads.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if there are
    /// currency mismatches, or if ids or names are duplicated.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("products", name)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        let mut staged = self.catalog.clone();

        for (id, product_fixture) in fixture.products {
            let (product, currency) = product_fixture.try_into_product()?;

            let catalog = staged.get_or_insert_with(|| Catalog::new(currency));

            ensure_currency(catalog.currency(), currency)?;

            catalog.insert(ProductId::new(id), product)?;
        }

        self.catalog = staged;

        Ok(self)
    }

    /// Load pricing rules from a YAML fixture file, replacing any loaded rules
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if no products
    /// are loaded, if a rule references an unknown product, or if a rule is invalid.
    pub fn load_rules(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let catalog = self.catalog.as_ref().ok_or(FixtureError::NoProducts)?;

        let contents = self.read("rules", name)?;
        let fixture: RulesFixture = serde_norway::from_str(&contents)?;

        let definitions = fixture
            .rules
            .into_iter()
            .map(|(id, rule_fixture)| {
                let product_id = ProductId::new(id.as_str());

                let product = catalog
                    .get(&product_id)
                    .ok_or_else(|| FixtureError::ProductNotFound(id.clone()))?;

                let definition = rule_fixture.try_into_definition(&id, product)?;

                Ok((product_id, definition))
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        self.rules = PricingRuleTable::from_definitions(definitions)?;

        Ok(self)
    }

    /// Load scanned item codes from a YAML fixture file, appending to any loaded items
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if no products
    /// are loaded, or if an item code is not in the catalog.
    pub fn load_items(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let catalog = self.catalog.as_ref().ok_or(FixtureError::NoProducts)?;

        let contents = self.read("items", name)?;
        let fixture: ItemsFixture = serde_norway::from_str(&contents)?;

        if let Some(unknown) = fixture
            .items
            .iter()
            .find(|code| catalog.product_id(code).is_none())
        {
            return Err(CheckoutError::InvalidItem(unknown.clone()).into());
        }

        self.items.extend(fixture.items);

        Ok(self)
    }

    /// Load the products and rules of a fixture set with the same name
    ///
    /// # Errors
    ///
    /// Returns an error if either fixture file cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_products(name)?.load_rules(name)
    }

    /// Load a fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn catalog(&self) -> Result<&Catalog, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoProducts)
    }

    /// Get the loaded rules
    pub fn rules(&self) -> &PricingRuleTable {
        &self.rules
    }

    /// Get the loaded item codes
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        Ok(self.catalog()?.currency())
    }

    /// Create a checkout with the loaded items scanned
    ///
    /// Scans the first `n` items, or all of them when `n` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or more items are requested than loaded.
    pub fn checkout(&self, n: Option<usize>) -> Result<Checkout<'_>, FixtureError> {
        let catalog = self.catalog()?;

        if let Some(n) = n
            && n > self.items.len()
        {
            return Err(FixtureError::NotEnoughItems {
                requested: n,
                available: self.items.len(),
            });
        }

        let mut checkout = Checkout::new(catalog, &self.rules);

        checkout.scan_all(
            self.items
                .iter()
                .take(n.unwrap_or(self.items.len()))
                .map(String::as_str),
        )?;

        Ok(checkout)
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));

        debug!(path = %file_path.display(), "loading fixture");

        Ok(fs::read_to_string(&file_path)?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_currency(
    expected: &'static Currency,
    found: &'static Currency,
) -> Result<(), FixtureError> {
    if expected == found {
        Ok(())
    } else {
        Err(FixtureError::CurrencyMismatch(
            expected.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        ))
    }
}
