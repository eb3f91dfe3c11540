//! Marketplace Core - Shared types library.
//!
//! This crate provides common types used across all marketplace components:
//! - `storefront` - Shopper-side cart and wishlist state
//! - `admin` - Back-office authorization (roles, permissions, route guards)
//! - `cli` - Command-line tools for inspecting access assignments
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no async runtime,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, products, and the closed role/permission sets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
