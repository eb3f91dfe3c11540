//! Saved-for-later products.
//!
//! A set of products keyed by id. Insertion order is kept for display and a
//! hash index keeps membership checks O(1).

use std::collections::HashSet;
use std::sync::Arc;

use marketplace_core::{Product, ProductId};
use tokio::sync::watch;
use tracing::debug;

use crate::cart::{CartStore, Variant};
use crate::error::CartError;

/// Immutable view of the wishlist.
#[derive(Debug, Clone, Default)]
pub struct WishlistSnapshot {
    items: Vec<Arc<Product>>,
    ids: HashSet<ProductId>,
}

impl WishlistSnapshot {
    /// Saved products in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[Arc<Product>] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.ids.contains(product_id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn insert(&mut self, product: Arc<Product>) -> bool {
        if !self.ids.insert(product.id.clone()) {
            return false;
        }
        self.items.push(product);
        true
    }

    fn remove(&mut self, product_id: &ProductId) -> Option<Arc<Product>> {
        if !self.ids.remove(product_id) {
            return None;
        }
        let index = self.items.iter().position(|p| &p.id == product_id)?;
        Some(self.items.remove(index))
    }
}

/// The shopper's wishlist.
#[derive(Debug)]
pub struct WishlistStore {
    state: watch::Sender<WishlistSnapshot>,
}

impl Default for WishlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WishlistStore {
    /// Create an empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(WishlistSnapshot::default()),
        }
    }

    /// Subscribe to wishlist snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WishlistSnapshot> {
        self.state.subscribe()
    }

    /// Clone of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> WishlistSnapshot {
        self.state.borrow().clone()
    }

    /// Save a product. Returns `false` if it was already saved.
    pub fn add(&self, product: Arc<Product>) -> bool {
        let product_id = product.id.clone();
        let added = self.state.send_if_modified(|list| list.insert(product));
        if added {
            debug!(%product_id, "Added product to wishlist");
        }
        added
    }

    /// Remove a product. Returns `false` if it was not saved.
    pub fn remove(&self, product_id: &ProductId) -> bool {
        self.take(product_id).is_some()
    }

    /// Flip membership and return whether the product is now saved.
    pub fn toggle(&self, product: Arc<Product>) -> bool {
        if self.remove(&product.id) {
            return false;
        }
        self.add(product);
        true
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.state.borrow().contains(product_id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.state.borrow().count()
    }

    /// Move a saved product into the cart with quantity 1 and no variant.
    ///
    /// Returns `Ok(false)` if the product was not in the wishlist. If the cart
    /// rejects the product it stays in the wishlist.
    ///
    /// # Errors
    ///
    /// Returns the [`CartError`] from [`CartStore::add_item`].
    pub fn move_to_cart(
        &self,
        product_id: &ProductId,
        cart: &CartStore,
    ) -> Result<bool, CartError> {
        let saved = self
            .state
            .borrow()
            .items()
            .iter()
            .find(|p| &p.id == product_id)
            .cloned();
        let Some(product) = saved else {
            return Ok(false);
        };
        cart.add_item(product, 1, Variant::none())?;
        self.remove(product_id);
        Ok(true)
    }

    fn take(&self, product_id: &ProductId) -> Option<Arc<Product>> {
        let mut taken = None;
        self.state.send_if_modified(|list| {
            taken = list.remove(product_id);
            taken.is_some()
        });
        if taken.is_some() {
            debug!(%product_id, "Removed product from wishlist");
        }
        taken
    }
}
