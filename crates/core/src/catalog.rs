//! The product catalog.
//!
//! The catalog is loaded once at startup and never mutated afterwards. It is
//! shared between the session store (item validation, checkout pricing) and
//! request handlers (catalog listing, cart pricing) behind an `Arc`.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::types::{ItemId, Price};

/// A product that can be put in a cart.
///
/// The unit price is named `price` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Price,
}

impl Product {
    /// Create a product.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, unit_price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
        }
    }
}

/// Unvalidated product as it appears in a catalog file.
#[derive(Debug, Deserialize)]
struct RawProduct {
    id: String,
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
}

/// Immutable mapping from item id to product.
///
/// Iteration order is the order products were supplied in.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Build a catalog from a list of products.
    ///
    /// # Errors
    ///
    /// Returns an error if a product has an empty id or name, or if two
    /// products share an id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId(position));
            }
            if product.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(product.id.to_string()));
            }
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(product.id.to_string()));
            }
        }
        Ok(Self { products, index })
    }

    /// Parse a catalog from a JSON array of `{"id", "name", "price"}` objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a price is negative, or the
    /// products fail the checks of [`Catalog::new`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawProduct> = serde_json::from_str(json)?;
        let products = raw
            .into_iter()
            .map(|p| {
                let price = Price::new(p.price)
                    .ok_or_else(|| CatalogError::NegativePrice(p.id.clone()))?;
                Ok(Product::new(p.id, p.name, price))
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        Self::new(products)
    }

    /// The built-in catalog served when no catalog file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        let products = vec![
            Product::new("1", "Mechanical Keyboard", Price::from_cents(9990)),
            Product::new("2", "Wireless Mouse", Price::from_cents(3950)),
            Product::new("3", "USB-C Hub", Price::from_cents(2900)),
            Product::new("4", "27\" Monitor", Price::from_cents(19900)),
            Product::new("5", "Noise-Canceling Headphones", Price::from_cents(14900)),
        ];
        let index = products
            .iter()
            .enumerate()
            .map(|(position, product)| (product.id.clone(), position))
            .collect();
        Self { products, index }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.index.get(id).and_then(|&position| self.products.get(position))
    }

    /// Whether the catalog has a product with this id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
