//! Checkout summary derived from a cart snapshot.

use marketplace_core::CurrencyCode;
use rust_decimal::Decimal;

use crate::cart::{CartLine, CartSnapshot};
use crate::config::StorefrontConfig;
use crate::error::SummaryError;

/// Cart lines sold by one vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerGroup {
    pub seller: String,
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
}

/// Totals shown next to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub currency: CurrencyCode,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    /// Groups in the order each seller first appears in the cart.
    pub groups: Vec<SellerGroup>,
}

impl OrderSummary {
    /// Build the summary for a cart.
    ///
    /// The delivery policy is denominated in the storefront currency, so the
    /// cart must be priced in it too. An empty cart always qualifies.
    ///
    /// # Errors
    ///
    /// - [`SummaryError::CurrencyMismatch`] if the cart is in another currency
    /// - [`SummaryError::TotalOverflow`] if subtotal plus delivery overflows
    pub fn new(cart: &CartSnapshot, config: &StorefrontConfig) -> Result<Self, SummaryError> {
        if let Some(found) = cart.currency().filter(|c| *c != config.currency) {
            return Err(SummaryError::CurrencyMismatch {
                expected: config.currency,
                found,
            });
        }

        let subtotal = cart.total();
        let delivery_fee = config.delivery.fee_for(subtotal);
        // No promotions are applied.
        let discount = Decimal::ZERO;
        let total = subtotal
            .checked_add(delivery_fee)
            .and_then(|t| t.checked_sub(discount))
            .ok_or(SummaryError::TotalOverflow)?;

        Ok(Self {
            currency: config.currency,
            subtotal,
            delivery_fee,
            discount,
            total,
            groups: group_by_seller(cart.lines()),
        })
    }

    /// Whether delivery is free for this cart.
    #[must_use]
    pub fn free_delivery(&self) -> bool {
        self.delivery_fee.is_zero()
    }
}

fn group_by_seller(lines: &[CartLine]) -> Vec<SellerGroup> {
    let mut groups: Vec<SellerGroup> = Vec::new();
    for line in lines {
        let seller = &line.product.seller.name;
        if let Some(group) = groups.iter_mut().find(|g| &g.seller == seller) {
            group.subtotal += line.line_total();
            group.lines.push(line.clone());
        } else {
            groups.push(SellerGroup {
                seller: seller.clone(),
                lines: vec![line.clone()],
                subtotal: line.line_total(),
            });
        }
    }
    groups
}
