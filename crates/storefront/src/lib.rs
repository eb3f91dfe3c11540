//! Marketplace storefront state.
//!
//! Session-scoped, in-memory stores for the shopper:
//!
//! - [`cart::CartStore`] - selections with quantity and variant
//! - [`wishlist::WishlistStore`] - products saved for later
//! - [`summary::OrderSummary`] - totals and delivery fee for the cart page
//!
//! Stores are constructed explicitly and passed to whatever needs them. Views
//! subscribe to snapshots instead of reading shared globals.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod summary;
pub mod wishlist;

pub use cart::{CartLine, CartSnapshot, CartStore, LineKey, Variant};
pub use config::{DeliveryPolicy, StorefrontConfig};
pub use error::{CartError, SummaryError};
pub use summary::{OrderSummary, SellerGroup};
pub use wishlist::{WishlistSnapshot, WishlistStore};
