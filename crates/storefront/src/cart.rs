//! Shopping cart state.
//!
//! The cart lives in memory for the browsing session. Every effective mutation
//! publishes a new [`CartSnapshot`] on a `watch` channel so views can re-render
//! from [`CartStore::subscribe`]. Aggregates (total and item count) are
//! recomputed on write, so reading them is O(1).
//!
//! # Line identity
//!
//! A line is identified by its [`LineKey`]: product id plus the selected color
//! and size. Adding a product with a key already in the cart merges the
//! quantities. Two variants of one product are separate lines.
//!
//! [`CartStore::remove_item`] and [`CartStore::set_quantity`] act on the whole
//! product (every variant line). Use [`CartStore::remove_line`] and
//! [`CartStore::set_line_quantity`] to edit a single variant.

use std::sync::Arc;

use marketplace_core::{CurrencyCode, Product, ProductId};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CartError;

/// Selected variant of a product.
///
/// `None` on an axis means "no selection", which is distinct from any named
/// option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Variant {
    /// Selected color name.
    pub color: Option<String>,
    /// Selected size name.
    pub size: Option<String>,
}

impl Variant {
    /// No color or size selected.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            color: None,
            size: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Check the selection against the options the product offers.
    fn validate(&self, product: &Product) -> Result<(), CartError> {
        if let Some(color) = &self.color {
            if !product.offers_color(color) {
                return Err(CartError::UnknownVariant {
                    product_id: product.id.clone(),
                    axis: "color",
                    value: color.clone(),
                });
            }
        }
        if let Some(size) = &self.size {
            if !product.offers_size(size) {
                return Err(CartError::UnknownVariant {
                    product_id: product.id.clone(),
                    axis: "size",
                    value: size.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant: Variant,
}

impl LineKey {
    #[must_use]
    pub const fn new(product_id: ProductId, variant: Variant) -> Self {
        Self {
            product_id,
            variant,
        }
    }
}

/// One selection in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// The product, shared with the catalog.
    pub product: Arc<Product>,
    /// Always at least 1.
    pub quantity: u32,
    /// Selected color and size.
    pub variant: Variant,
}

impl CartLine {
    /// Product id of this line.
    #[must_use]
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Identity key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product.id.clone(), self.variant.clone())
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product.id == key.product_id && self.variant == key.variant
    }

    /// Unit price times quantity.
    ///
    /// Lines held by a cart always fit; a line built by hand whose total
    /// overflows reports `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.times(self.quantity).unwrap_or(Decimal::MAX)
    }
}

/// Immutable view of the cart at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
    total: Decimal,
    count: u64,
}

impl CartSnapshot {
    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line, of any variant, is for this product.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lines.iter().any(|line| line.product_id() == product_id)
    }

    /// The line with this exact key.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(key))
    }

    /// Currency of the cart, or `None` when empty.
    #[must_use]
    pub fn currency(&self) -> Option<CurrencyCode> {
        self.lines.first().map(|line| line.product.price.currency_code)
    }

    /// Install `lines` with fresh aggregates. Leaves the snapshot untouched
    /// and returns `false` if the total does not fit in a `Decimal`.
    fn replace_lines(&mut self, lines: Vec<CartLine>) -> bool {
        let mut total = Decimal::ZERO;
        for line in &lines {
            let Some(sum) = line
                .product
                .price
                .times(line.quantity)
                .and_then(|line_total| total.checked_add(line_total))
            else {
                return false;
            };
            total = sum;
        }
        self.count = lines.iter().map(|line| u64::from(line.quantity)).sum();
        self.total = total;
        self.lines = lines;
        true
    }

    /// Drop every line matching the predicate. Returns whether any was removed.
    fn remove_where(&mut self, predicate: impl Fn(&CartLine) -> bool) -> bool {
        let mut lines = self.lines.clone();
        lines.retain(|line| !predicate(line));
        // Unit prices are non-negative, so a subset of the lines always fits.
        lines.len() != self.lines.len() && self.replace_lines(lines)
    }

    /// Apply `quantity` to the lines matching the predicate.
    fn set_quantity_where(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        predicate: impl Fn(&CartLine) -> bool,
    ) -> Result<bool, CartError> {
        let mut lines = self.lines.clone();
        let mut changed = false;
        for line in lines.iter_mut().filter(|line| predicate(line)) {
            if line.quantity != quantity {
                line.quantity = quantity;
                changed = true;
            }
        }
        if !changed {
            return Ok(false);
        }
        if self.replace_lines(lines) {
            Ok(true)
        } else {
            Err(CartError::TotalOverflow {
                product_id: product_id.clone(),
            })
        }
    }
}

/// The shopper's cart.
///
/// Construct one per session and hand a reference to whatever needs it.
#[derive(Debug)]
pub struct CartStore {
    state: watch::Sender<CartSnapshot>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(CartSnapshot::default()),
        }
    }

    /// Subscribe to cart snapshots.
    ///
    /// The receiver observes the current snapshot immediately and is notified
    /// after every mutation that changes the cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.state.subscribe()
    }

    /// Clone of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.borrow().clone()
    }

    /// Add `quantity` units of a product variant.
    ///
    /// Merges into the line with the same [`LineKey`] if there is one,
    /// otherwise appends a new line. Stock is not enforced here.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity` is 0
    /// - [`CartError::UnknownVariant`] if the product does not offer the
    ///   selected color or size
    /// - [`CartError::CurrencyMismatch`] if the cart holds lines in another
    ///   currency
    /// - [`CartError::InvalidPrice`] if the unit price is negative
    /// - [`CartError::QuantityOverflow`] if the merged quantity overflows
    /// - [`CartError::TotalOverflow`] if the cart total would not fit
    ///
    /// A rejected add leaves the cart unchanged.
    pub fn add_item(
        &self,
        product: Arc<Product>,
        quantity: u32,
        variant: Variant,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity {
                product_id: product.id.clone(),
                quantity,
            });
        }
        if product.price.amount.is_sign_negative() {
            return Err(CartError::InvalidPrice {
                product_id: product.id.clone(),
                amount: product.price.amount,
            });
        }
        variant.validate(&product)?;

        let product_id = product.id.clone();
        let mut outcome = Ok(());
        self.state.send_if_modified(|cart| {
            let currency = product.price.currency_code;
            if let Some(expected) = cart.currency() {
                if expected != currency {
                    outcome = Err(CartError::CurrencyMismatch {
                        product_id: product_id.clone(),
                        expected,
                        found: currency,
                    });
                    return false;
                }
            }

            let key = LineKey::new(product_id.clone(), variant);
            let mut lines = cart.lines.clone();
            if let Some(line) = lines.iter_mut().find(|line| line.matches(&key)) {
                let Some(merged) = line.quantity.checked_add(quantity) else {
                    outcome = Err(CartError::QuantityOverflow {
                        product_id: product_id.clone(),
                        max: u32::MAX,
                    });
                    return false;
                };
                line.quantity = merged;
            } else {
                lines.push(CartLine {
                    product,
                    quantity,
                    variant: key.variant,
                });
            }

            if !cart.replace_lines(lines) {
                outcome = Err(CartError::TotalOverflow {
                    product_id: product_id.clone(),
                });
                return false;
            }
            debug!(%product_id, quantity, "Added to cart");
            true
        });
        outcome
    }

    /// Remove every line for this product, whatever the variant.
    ///
    /// Unknown product ids are a no-op.
    pub fn remove_item(&self, product_id: &ProductId) {
        let removed = self
            .state
            .send_if_modified(|cart| cart.remove_where(|line| line.product_id() == product_id));
        if removed {
            debug!(%product_id, "Removed product from cart");
        }
    }

    /// Set the quantity of every line for this product.
    ///
    /// A quantity of 0 removes the product, exactly like
    /// [`remove_item`](Self::remove_item).
    ///
    /// # Errors
    ///
    /// [`CartError::TotalOverflow`] if the cart total would not fit; the cart
    /// is left unchanged.
    pub fn set_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove_item(product_id);
            return Ok(());
        }
        let mut outcome = Ok(());
        self.state.send_if_modified(|cart| {
            cart.set_quantity_where(product_id, quantity, |line| line.product_id() == product_id)
                .unwrap_or_else(|e| {
                    outcome = Err(e);
                    false
                })
        });
        outcome
    }

    /// Remove the single line with this key. Returns whether it existed.
    pub fn remove_line(&self, key: &LineKey) -> bool {
        self.state
            .send_if_modified(|cart| cart.remove_where(|line| line.matches(key)))
    }

    /// Set the quantity of the single line with this key.
    ///
    /// A quantity of 0 removes the line. Unknown keys are a no-op.
    ///
    /// # Errors
    ///
    /// [`CartError::TotalOverflow`] if the cart total would not fit; the cart
    /// is left unchanged.
    pub fn set_line_quantity(&self, key: &LineKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove_line(key);
            return Ok(());
        }
        let mut outcome = Ok(());
        self.state.send_if_modified(|cart| {
            cart.set_quantity_where(&key.product_id, quantity, |line| line.matches(key))
                .unwrap_or_else(|e| {
                    outcome = Err(e);
                    false
                })
        });
        outcome
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.state.send_if_modified(|cart| {
            if cart.lines.is_empty() {
                return false;
            }
            *cart = CartSnapshot::default();
            true
        });
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.state.borrow().total()
    }

    /// Sum of quantities over all lines (not the number of lines).
    #[must_use]
    pub fn count(&self) -> u64 {
        self.state.borrow().count()
    }

    /// Whether any line is for this product.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.state.borrow().contains(product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.state.borrow().lines().len()
    }
}
