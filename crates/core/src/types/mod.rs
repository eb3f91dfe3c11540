//! Core types for the marketplace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod access;
pub mod id;
pub mod price;
pub mod product;

pub use access::{Permission, Role, UnknownPermission, UnknownRole};
pub use id::{ProductId, ProductIdError, UserId};
pub use price::{CurrencyCode, Price};
pub use product::{ColorOption, Product, Seller};
