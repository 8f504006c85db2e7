//! In-memory product catalog and carts, the reference [CartStore].
//!
//! The checkout flow owns carts; the engine only ever reads totals through
//! the [CartStore] contract. This implementation backs tests, demos and the
//! experiments harness.

use std::collections::HashMap;

use crate::contracts::{CartStore, CartTotals, StoreError};
use crate::error::PricingError;
use crate::util::IdSource;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    /// How many "units" one piece counts as for the solo-minimum rule.
    pub unit_factor: i64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub qty: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: HashMap<String, Product>,
    carts: HashMap<String, Vec<CartLine>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the standard demo products.
    pub fn with_default_products() -> Self {
        let mut catalog = Self::new();
        for product in default_products() {
            catalog.add_product(product);
        }
        catalog
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Create a cart after validating every line: quantities must be
    /// positive and products must exist.
    pub fn create_cart(
        &mut self,
        ids: &mut IdSource,
        lines: Vec<CartLine>,
    ) -> Result<String, PricingError> {
        for line in &lines {
            if line.qty < 1 {
                return Err(PricingError::InvalidQuantity {
                    product_id: line.product_id.clone(),
                    qty: line.qty,
                });
            }
            if !self.products.contains_key(&line.product_id) {
                return Err(PricingError::ProductNotFound(line.product_id.clone()));
            }
        }
        let cart_id = ids.next("c");
        self.carts.insert(cart_id.clone(), lines);
        Ok(cart_id)
    }

    pub fn cart_lines(&self, cart_id: &str) -> Option<&[CartLine]> {
        self.carts.get(cart_id).map(Vec::as_slice)
    }
}

impl CartStore for InMemoryCatalog {
    fn cart_totals(&self, cart_id: &str) -> Result<CartTotals, StoreError> {
        let lines = self
            .carts
            .get(cart_id)
            .ok_or_else(|| StoreError::CartNotFound(cart_id.to_string()))?;

        let mut subtotal_cents = 0;
        let mut units_total = 0;
        for line in lines {
            let product = self
                .products
                .get(&line.product_id)
                .ok_or_else(|| StoreError::ProductNotFound(line.product_id.clone()))?;
            if !product.active {
                continue;
            }
            subtotal_cents += product.price_cents * line.qty;
            units_total += product.unit_factor * line.qty;
        }
        Ok(CartTotals {
            subtotal_cents,
            units_total,
        })
    }
}

/// The seed catalog: two single cookies and a six-unit party box.
pub fn default_products() -> Vec<Product> {
    vec![
        Product {
            id: "p_1".into(),
            name: "Classic Cookie".into(),
            price_cents: 300,
            unit_factor: 1,
            active: true,
        },
        Product {
            id: "p_2".into(),
            name: "Double Choc".into(),
            price_cents: 350,
            unit_factor: 1,
            active: true,
        },
        Product {
            id: "p_3".into(),
            name: "Party Box (6)".into(),
            price_cents: 1_600,
            unit_factor: 6,
            active: true,
        },
    ]
}
