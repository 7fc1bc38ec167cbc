//! Statistics and per-period reports emitted by the core.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::client::Tier;
use super::fairness::FairnessMetrics;
use super::resource::DualPrices;
use super::solution::Solution;

/// Admission totals for one tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierStats {
    pub total_requests: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub acceptance_rate: f64,
    pub revenue: Decimal,
    pub avg_price_paid: Decimal,
}

/// Distribution of effective prices seen by requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

/// Cumulative admission statistics of one pricing controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PricingStats {
    pub total_requests: u64,
    pub accepted_requests: u64,
    pub rejected_requests: u64,
    pub acceptance_rate: f64,
    pub total_revenue: Decimal,
    pub revenue_per_request: Decimal,
    pub tiers: BTreeMap<Tier, TierStats>,
    pub prices: PriceStats,
}

/// Re-optimization statistics of one adaptive controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdaptiveStats {
    pub total_solves: u64,
    pub total_decisions: u64,
    pub skipped_solves: u64,
    pub skip_rate: f64,
    pub triggered_by_time: u64,
    pub triggered_by_load: u64,
    pub smoothed_prices: Option<DualPrices>,
    /// Population std of the raw per-solve duals, per resource.
    pub price_volatility: DualPrices,
    pub demand_history_size: usize,
}

/// Everything the core emits for one simulated period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period: u64,
    pub timestamp_secs: f64,
    /// Why the solution was re-solved or reused.
    pub reason: String,
    /// Fraction of nominal capacity offered to the allocator.
    pub capacity_factor: f64,
    pub solution: Solution,
    pub fairness: FairnessMetrics,
    pub accepted: u64,
    pub rejected: u64,
    pub revenue: Decimal,
    /// Cumulative pricing statistics after this period.
    pub pricing: PricingStats,
}

/// Final summary of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub periods: u64,
    pub infeasible_periods: u64,
    pub mean_jains_index: f64,
    pub adaptive: AdaptiveStats,
    pub pricing: PricingStats,
}
