//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_CURRENCY` - Currency carts are priced in (default: BDT)
//! - `STOREFRONT_FREE_DELIVERY_THRESHOLD` - Subtotal above which delivery is free (default: 5000)
//! - `STOREFRONT_DELIVERY_FEE` - Flat delivery fee below the threshold (default: 120)

use marketplace_core::CurrencyCode;
use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Currency carts are priced in
    pub currency: CurrencyCode,
    /// Delivery pricing applied to the cart summary
    pub delivery: DeliveryPolicy,
}

/// Delivery fee rule shown in the cart summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Subtotals strictly above this ship free.
    pub free_threshold: Decimal,
    /// Fee charged otherwise.
    pub flat_fee: Decimal,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Decimal::from(5000),
            flat_fee: Decimal::from(120),
        }
    }
}

impl DeliveryPolicy {
    /// Delivery fee for a subtotal. Empty carts pay nothing.
    #[must_use]
    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal.is_zero() || subtotal > self.free_threshold {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            delivery: DeliveryPolicy::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let currency = get_env_or_default("STOREFRONT_CURRENCY", "BDT")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_CURRENCY".to_string(), e))?;
        let free_threshold = parse_amount(
            "STOREFRONT_FREE_DELIVERY_THRESHOLD",
            &get_env_or_default("STOREFRONT_FREE_DELIVERY_THRESHOLD", "5000"),
        )?;
        let flat_fee = parse_amount(
            "STOREFRONT_DELIVERY_FEE",
            &get_env_or_default("STOREFRONT_DELIVERY_FEE", "120"),
        )?;

        Ok(Self {
            currency,
            delivery: DeliveryPolicy {
                free_threshold,
                flat_fee,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a non-negative money amount.
fn parse_amount(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    let amount = value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(amount)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("K", "120").unwrap(), Decimal::from(120));
        assert_eq!(parse_amount("K", " 99.50 ").unwrap(), Decimal::new(9950, 2));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        let err = parse_amount("STOREFRONT_DELIVERY_FEE", "free").unwrap_err();
        assert!(err.to_string().starts_with("Invalid environment variable STOREFRONT_DELIVERY_FEE"));
        assert!(parse_amount("K", "-1").is_err());
    }

    // The only test touching STOREFRONT_* variables, so it cannot race.
    #[test]
    #[allow(unsafe_code)]
    fn test_from_env() {
        const KEYS: [&str; 3] = [
            "STOREFRONT_CURRENCY",
            "STOREFRONT_FREE_DELIVERY_THRESHOLD",
            "STOREFRONT_DELIVERY_FEE",
        ];
        let set = |pairs: [(&str, &str); 3]| {
            for (key, value) in pairs {
                unsafe { std::env::set_var(key, value) };
            }
        };

        set([(KEYS[0], "usd"), (KEYS[1], "75"), (KEYS[2], "4.99")]);
        let config = StorefrontConfig::from_env().unwrap();
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.delivery.free_threshold, Decimal::from(75));
        assert_eq!(config.delivery.flat_fee, Decimal::new(499, 2));

        set([(KEYS[0], "BDT"), (KEYS[1], "5000"), (KEYS[2], "-5")]);
        let err = StorefrontConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_DELIVERY_FEE"));

        set([(KEYS[0], "XYZ"), (KEYS[1], "5000"), (KEYS[2], "120")]);
        let err = StorefrontConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_CURRENCY"));

        for key in KEYS {
            unsafe { std::env::remove_var(key) };
        }
        assert_eq!(StorefrontConfig::from_env().unwrap(), StorefrontConfig::default());
    }

    #[test]
    fn test_delivery_fee() {
        let policy = DeliveryPolicy::default();
        assert_eq!(policy.fee_for(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(policy.fee_for(Decimal::from(4999)), Decimal::from(120));
        assert_eq!(policy.fee_for(Decimal::from(5000)), Decimal::from(120));
        assert_eq!(policy.fee_for(Decimal::from(5001)), Decimal::ZERO);
    }
}
