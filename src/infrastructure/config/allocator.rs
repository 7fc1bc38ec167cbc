//! Allocator configuration: capacity, objective, and resource dimensions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{ObjectiveKind, SystemResources, Tier, TierPrices};
use crate::error::ConfigError;

fn default_capacity() -> f64 {
    100.0
}

/// Single-resource allocator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Aggregate capacity in requests per second. Defaults to 100.
    #[serde(default = "default_capacity")]
    pub capacity: f64,

    /// Objective maximised by the allocators. Defaults to throughput.
    #[serde(default)]
    pub objective: ObjectiveKind,

    /// Per-request tier prices for the revenue objective.
    #[serde(default)]
    pub tier_prices: TierPrices,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            objective: ObjectiveKind::default(),
            tier_prices: TierPrices::default(),
        }
    }
}

impl AllocatorConfig {
    /// Validate capacity and tier prices.
    ///
    /// # Errors
    ///
    /// Returns an error if capacity is not a positive finite number or any
    /// tier price is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return Err(ConfigError::invalid("capacity", "must be greater than 0"));
        }
        for tier in [Tier::Premium, Tier::Standard, Tier::Free] {
            if self.tier_prices.price(tier) < Decimal::ZERO {
                return Err(ConfigError::invalid(
                    "tier_prices",
                    format!("{tier} price must be 0 or greater"),
                ));
            }
        }
        Ok(())
    }
}

/// Validate multi-resource capacities.
///
/// # Errors
///
/// Returns an error if any capacity is not a positive finite number.
pub fn validate_resources(resources: &SystemResources) -> Result<(), ConfigError> {
    let dims = [
        ("resources.cpu_ms", resources.cpu_ms),
        ("resources.memory_mb", resources.memory_mb),
        ("resources.network_kb", resources.network_kb),
    ];
    for (field, value) in dims {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::invalid(field, "must be greater than 0"));
        }
    }
    Ok(())
}
