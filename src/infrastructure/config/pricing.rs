//! Pricing controller configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_min_price() -> Decimal {
    Decimal::new(1, 2) // $0.01
}

const fn default_true() -> bool {
    true
}

/// Admission pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Price floor charged even without congestion. Defaults to 0.01.
    #[serde(default = "default_min_price")]
    pub min_price: Decimal,

    /// Charge admitted requests. When false, admission decisions are made
    /// as usual but nothing is billed.
    #[serde(default = "default_true")]
    pub enable_charging: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            min_price: default_min_price(),
            enable_charging: true,
        }
    }
}

impl PricingConfig {
    /// Validate the price floor.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_price` is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_price < Decimal::ZERO {
            return Err(ConfigError::invalid("min_price", "must be 0 or greater"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_floor_is_one_cent() {
        let config = PricingConfig::default();
        assert_eq!(config.min_price, dec!(0.01));
        assert!(config.enable_charging);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_floor_is_rejected() {
        let config = PricingConfig {
            min_price: dec!(-0.01),
            ..PricingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
