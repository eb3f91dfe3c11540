//! Shared fixtures for the marketplace integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `shopping_session` - cart, wishlist and checkout summary together
//! - `admin_access` - authorization view, directory edits and the admin guard

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use marketplace_admin::{AccessDirectory, DirectoryError, InMemoryDirectory};
use marketplace_core::{ColorOption, CurrencyCode, Price, Product, ProductId, UserId};
use rust_decimal::Decimal;
use tokio::sync::Semaphore;

/// A product priced in BDT with stock, sold by `seller`.
///
/// # Panics
///
/// Panics if `id` is not a valid product id.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn product(id: &str, price: i64, seller: &str) -> Arc<Product> {
    Arc::new(
        Product::new(
            ProductId::parse(id).unwrap(),
            format!("Product {id}"),
            Price::new(Decimal::from(price), CurrencyCode::BDT),
        )
        .with_stock(20)
        .with_seller(seller, 4.5),
    )
}

/// A product offered in red/blue and S/M/L.
#[must_use]
pub fn apparel(id: &str, price: i64, seller: &str) -> Arc<Product> {
    let base = Arc::unwrap_or_clone(product(id, price, seller));
    Arc::new(
        base.with_colors(vec![
            ColorOption::new("Red", "#ff0000"),
            ColorOption::new("Blue", "#0000ff"),
        ])
        .with_sizes(["S", "M", "L"]),
    )
}

/// Directory whose fetches block until the user's gate is opened.
///
/// Lets a test decide the order in which concurrent fetches complete.
#[derive(Debug, Default)]
pub struct GatedDirectory {
    pub rows: InMemoryDirectory,
    gates: Mutex<HashMap<UserId, Arc<Semaphore>>>,
}

impl GatedDirectory {
    #[must_use]
    pub fn new(rows: InMemoryDirectory) -> Self {
        Self {
            rows,
            gates: Mutex::default(),
        }
    }

    fn gate(&self, user_id: UserId) -> Arc<Semaphore> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            gates
                .entry(user_id)
                .or_insert_with(|| Arc::new(Semaphore::new(0))),
        )
    }

    /// Let one fetch for `user_id` through. A fetch reads both collections.
    pub fn open(&self, user_id: UserId) {
        self.gate(user_id).add_permits(2);
    }

    async fn pass(&self, user_id: UserId) -> Result<(), DirectoryError> {
        let gate = self.gate(user_id);
        gate.acquire()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?
            .forget();
        Ok(())
    }
}

impl AccessDirectory for GatedDirectory {
    async fn role_tags(&self, user_id: UserId) -> Result<Vec<String>, DirectoryError> {
        self.pass(user_id).await?;
        self.rows.role_tags(user_id).await
    }

    async fn permission_tags(&self, user_id: UserId) -> Result<Vec<String>, DirectoryError> {
        self.pass(user_id).await?;
        self.rows.permission_tags(user_id).await
    }
}
