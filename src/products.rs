//! Products

use std::fmt;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::{AUD, Currency};
use thiserror::Error;

/// Product identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product name, also the item code scanned at the till
    pub name: String,

    /// Normal unit price
    pub price: Decimal,
}

impl Product {
    /// Create a new product.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Errors related to catalog construction.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A product with this identifier already exists.
    #[error("Duplicate product id {0}")]
    DuplicateProduct(ProductId),

    /// Another product is already scanned with this item code.
    #[error("Item code {0} is already used by product {1}")]
    DuplicateItemCode(String, ProductId),
}

/// Product catalog, keyed by product id and indexed by item code.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: FxHashMap<ProductId, Product>,
    item_codes: FxHashMap<String, ProductId>,
    currency: &'static Currency,
}

impl Catalog {
    /// Create an empty catalog priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: FxHashMap::default(),
            item_codes: FxHashMap::default(),
            currency,
        }
    }

    /// The built-in store catalog.
    #[must_use]
    pub fn default_catalog() -> Self {
        let products = [
            ("1", "ipd", Decimal::new(54999, 2)),
            ("2", "mbp", Decimal::new(139999, 2)),
            ("3", "atv", Decimal::new(10950, 2)),
            ("4", "vga", Decimal::new(3000, 2)),
        ];

        let mut catalog = Self::new(AUD);

        for (id, name, price) in products {
            catalog
                .products
                .insert(ProductId::new(id), Product::new(name, price));

            catalog
                .item_codes
                .insert(name.to_string(), ProductId::new(id));
        }

        catalog
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicateProduct`]: the id is already in the catalog.
    /// - [`CatalogError::DuplicateItemCode`]: another product uses the same name.
    pub fn insert(&mut self, id: ProductId, product: Product) -> Result<(), CatalogError> {
        if self.products.contains_key(&id) {
            return Err(CatalogError::DuplicateProduct(id));
        }

        if let Some(existing) = self.item_codes.get(&product.name) {
            return Err(CatalogError::DuplicateItemCode(
                product.name,
                existing.clone(),
            ));
        }

        self.item_codes.insert(product.name.clone(), id.clone());
        self.products.insert(id, product);

        Ok(())
    }

    /// Look up a product by id.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// Resolve a scanned item code to its product id.
    pub fn product_id(&self, item_code: &str) -> Option<&ProductId> {
        self.item_codes.get(item_code)
    }

    /// Iterate over the products, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &Product)> {
        self.products.iter()
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency the catalog is priced in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
