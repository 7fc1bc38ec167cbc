//! Objective selection for the allocation LP.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::client::{Client, Tier};

/// Which linear objective the allocators maximise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveKind {
    /// `Σ weight_i * rate_i`
    #[default]
    Throughput,
    /// `Σ tier_price(tier_i) * rate_i`
    Revenue,
}

impl ObjectiveKind {
    /// Objective coefficient for one client's rate variable.
    #[must_use]
    pub fn coefficient(&self, client: &Client, prices: &TierPrices) -> f64 {
        match self {
            Self::Throughput => client.weight(),
            Self::Revenue => prices.price(client.tier()).to_f64().unwrap_or(0.0),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Throughput => "throughput",
            Self::Revenue => "revenue",
        }
    }
}

fn default_premium() -> Decimal {
    Decimal::new(50, 2)
}

fn default_standard() -> Decimal {
    Decimal::new(20, 2)
}

fn default_free() -> Decimal {
    Decimal::new(1, 2)
}

/// Per-request price of each tier, used by the revenue objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPrices {
    #[serde(default = "default_premium")]
    pub premium: Decimal,
    #[serde(default = "default_standard")]
    pub standard: Decimal,
    #[serde(default = "default_free")]
    pub free: Decimal,
}

impl TierPrices {
    #[must_use]
    pub const fn price(&self, tier: Tier) -> Decimal {
        match tier {
            Tier::Premium => self.premium,
            Tier::Standard => self.standard,
            Tier::Free => self.free,
        }
    }
}

impl Default for TierPrices {
    fn default() -> Self {
        Self {
            premium: default_premium(),
            standard: default_standard(),
            free: default_free(),
        }
    }
}
