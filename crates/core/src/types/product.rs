//! Catalog product as seen by the shopper-side stores.
//!
//! Products are owned by the external catalog. The stores treat them as
//! immutable values and only read the id, price, seller and variant axes.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A named color option with its swatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption {
    /// Display name, also used as the selection key (e.g. "Titanium Black").
    pub name: String,
    /// Swatch color as a CSS hex string.
    pub hex: String,
}

impl ColorOption {
    /// Create a color option.
    #[must_use]
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }
}

/// The vendor selling a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    /// Store name shown on product and cart pages.
    pub name: String,
    /// Average rating out of 5.
    pub rating: f32,
}

impl Default for Seller {
    fn default() -> Self {
        Self {
            name: "Marketplace".to_string(),
            rating: 0.0,
        }
    }
}

/// A product listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Brand name.
    #[serde(default)]
    pub brand: String,
    /// Vendor selling the product.
    #[serde(default)]
    pub seller: Seller,
    /// Current unit price.
    pub price: Price,
    /// Price before discount, if the product is on sale.
    #[serde(default)]
    pub original_price: Option<rust_decimal::Decimal>,
    /// Units available.
    #[serde(default)]
    pub stock: u32,
    /// Color variants, empty when the product has no color axis.
    #[serde(default)]
    pub colors: Vec<ColorOption>,
    /// Size variants, empty when the product has no size axis.
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl Product {
    /// Create a product without variants and without stock.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            brand: String::new(),
            seller: Seller::default(),
            price,
            original_price: None,
            stock: 0,
            colors: Vec::new(),
            sizes: Vec::new(),
        }
    }

    /// Set the available stock.
    #[must_use]
    pub const fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Set the seller.
    #[must_use]
    pub fn with_seller(mut self, name: impl Into<String>, rating: f32) -> Self {
        self.seller = Seller {
            name: name.into(),
            rating,
        };
        self
    }

    /// Set the color options.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<ColorOption>) -> Self {
        self.colors = colors;
        self
    }

    /// Set the size options.
    #[must_use]
    pub fn with_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the product offers a color with this name.
    #[must_use]
    pub fn offers_color(&self, name: &str) -> bool {
        self.colors.iter().any(|c| c.name == name)
    }

    /// Whether the product offers this size.
    #[must_use]
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// Whether any units are available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Clamp a quantity picked on the product page to what can be ordered.
    ///
    /// Returns 0 when the product is out of stock, otherwise a value in
    /// `1..=stock`.
    #[must_use]
    pub fn max_orderable(&self, requested: u32) -> u32 {
        if self.stock == 0 {
            return 0;
        }
        requested.clamp(1, self.stock)
    }

    /// Discount off the original price, rounded down to a whole percent.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        use rust_decimal::prelude::ToPrimitive;

        let original = self.original_price?;
        if original <= self.price.amount || original.is_zero() {
            return None;
        }
        let pct = (original - self.price.amount) / original * rust_decimal::Decimal::ONE_HUNDRED;
        pct.floor().to_u32()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::CurrencyCode;

    fn phone() -> Product {
        Product::new(
            ProductId::parse("gad-001").unwrap(),
            "Galaxy S24 Ultra",
            Price::new(Decimal::from(124_999), CurrencyCode::BDT),
        )
        .with_stock(5)
        .with_colors(vec![
            ColorOption::new("Titanium Black", "#1a1a1a"),
            ColorOption::new("Titanium Gray", "#6b6b6b"),
        ])
    }

    #[test]
    fn test_offers_variants() {
        let product = phone().with_sizes(["256GB", "512GB"]);
        assert!(product.offers_color("Titanium Gray"));
        assert!(!product.offers_color("Red"));
        assert!(product.offers_size("512GB"));
        assert!(!product.offers_size("1TB"));
    }

    #[test]
    fn test_max_orderable_clamps_to_stock() {
        let product = phone();
        assert_eq!(product.max_orderable(3), 3);
        assert_eq!(product.max_orderable(9), 5);
        assert_eq!(product.max_orderable(0), 1);
        assert_eq!(product.with_stock(0).max_orderable(2), 0);
    }

    #[test]
    fn test_discount_percent() {
        let mut product = phone();
        assert_eq!(product.discount_percent(), None);

        product.original_price = Some(Decimal::from(139_999));
        assert_eq!(product.discount_percent(), Some(10));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{
            "id": "home-004",
            "name": "Air Fryer",
            "price": { "amount": "8999", "currency_code": "BDT" }
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "home-004");
        assert!(product.colors.is_empty());
        assert_eq!(product.stock, 0);
        assert_eq!(product.seller, Seller::default());
    }
}
