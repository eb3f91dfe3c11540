//! Error types for shopper-side stores.

use marketplace_core::{CurrencyCode, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by cart mutations.
///
/// All of these are local and recoverable: the cart is left unchanged and the
/// caller shows a transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity must be at least 1 when adding to the cart.
    #[error("invalid quantity {quantity} for {product_id}: must be at least 1")]
    InvalidQuantity {
        /// Product the request was for.
        product_id: ProductId,
        /// Rejected quantity.
        quantity: u32,
    },

    /// The product does not offer the selected color or size.
    #[error("{product_id} has no {axis} option named {value:?}")]
    UnknownVariant {
        /// Product the request was for.
        product_id: ProductId,
        /// Variant axis ("color" or "size").
        axis: &'static str,
        /// Rejected selection.
        value: String,
    },

    /// Merging the quantity into an existing line would overflow.
    #[error("quantity for {product_id} would exceed {max}")]
    QuantityOverflow {
        /// Product the request was for.
        product_id: ProductId,
        /// Largest representable line quantity.
        max: u32,
    },

    /// Unit prices must not be negative.
    #[error("{product_id} has a negative price {amount}")]
    InvalidPrice {
        /// Product the request was for.
        product_id: ProductId,
        /// Rejected unit price.
        amount: Decimal,
    },

    /// The cart total would exceed what a `Decimal` can hold.
    #[error("cart total overflows after changing {product_id}")]
    TotalOverflow {
        /// Product the request was for.
        product_id: ProductId,
    },

    /// The cart already holds lines priced in another currency.
    #[error("{product_id} is priced in {found}, cart is in {expected}")]
    CurrencyMismatch {
        /// Product the request was for.
        product_id: ProductId,
        /// Currency of the lines already in the cart.
        expected: CurrencyCode,
        /// Currency of the rejected product.
        found: CurrencyCode,
    },
}

/// Errors building an [`OrderSummary`](crate::summary::OrderSummary).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// The cart is priced in a currency the delivery policy is not set in.
    #[error("cart is priced in {found}, storefront is configured for {expected}")]
    CurrencyMismatch {
        /// Configured storefront currency.
        expected: CurrencyCode,
        /// Currency of the cart lines.
        found: CurrencyCode,
    },

    /// Subtotal plus delivery does not fit in a `Decimal`.
    #[error("order total overflows")]
    TotalOverflow,
}
