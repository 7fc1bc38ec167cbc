//! Dual-price admission control.
//!
//! Each request is priced at `max(dual_price, min_price)` and admitted when
//! the client is willing to pay that much. Premium requests are turned away
//! outright when no hard-SLA headroom is left. Running totals accumulate
//! until [`PricingController::reset`].

use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::{info, trace};

use crate::domain::{
    PriceStats, PricingStats, Request, RequestDecision, RequestOutcome, Tier, TierStats,
};
use crate::error::ConfigError;
use crate::infrastructure::config::PricingConfig;

const PRICE_DP: u32 = 6;

#[derive(Debug, Clone, Copy, Default)]
struct TierTotals {
    requests: u64,
    accepted: u64,
    revenue: Decimal,
}

/// Per-request admission and charging with running statistics.
///
/// Charged prices are kept as a count per distinct price, so memory grows
/// with the number of distinct prices rather than with requests.
#[derive(Debug, Clone)]
pub struct PricingController {
    config: PricingConfig,
    tiers: BTreeMap<Tier, TierTotals>,
    prices: BTreeMap<Decimal, u64>,
}

impl PricingController {
    /// Create a controller with empty totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the price floor is negative.
    pub fn new(config: PricingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            min_price = %config.min_price,
            charging = config.enable_charging,
            "Pricing controller ready"
        );
        Ok(Self {
            config,
            tiers: BTreeMap::new(),
            prices: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// `max(dual_price, min_price)` as money. Non-finite prices saturate.
    #[must_use]
    pub fn effective_price(&self, dual_price: f64) -> Decimal {
        let dual = if dual_price.is_infinite() && dual_price > 0.0 {
            Decimal::MAX
        } else {
            Decimal::from_f64(dual_price.max(0.0))
                .map(|d| d.round_dp(PRICE_DP))
                .unwrap_or(Decimal::ZERO)
        };
        dual.max(self.config.min_price)
    }

    /// Decide one request at the given congestion price and headroom.
    pub fn process(
        &mut self,
        request: &Request,
        dual_price: f64,
        sla_headroom: f64,
    ) -> RequestOutcome {
        let started = Instant::now();
        let price = self.effective_price(dual_price);

        let decision = if request.tier == Tier::Premium && sla_headroom <= 0.0 {
            RequestDecision::RejectedHardSla
        } else if request.max_price >= price {
            if price.is_zero() {
                RequestDecision::AcceptedFree
            } else {
                RequestDecision::AcceptedCharged
            }
        } else {
            RequestDecision::RejectedPrice
        };

        let charge = if decision.is_accepted() && self.config.enable_charging {
            price
        } else {
            Decimal::ZERO
        };

        let totals = self.tiers.entry(request.tier).or_default();
        totals.requests += 1;
        if decision.is_accepted() {
            totals.accepted += 1;
            totals.revenue += charge;
        }
        *self.prices.entry(price).or_default() += 1;

        trace!(
            client = %request.client_id,
            decision = decision.as_str(),
            price = %price,
            max_price = %request.max_price,
            "Request decided"
        );

        RequestOutcome {
            request: request.clone(),
            decision,
            dual_price,
            charge,
            decision_time: started.elapsed(),
        }
    }

    /// Totals, per-tier breakdown, and price distribution so far.
    #[must_use]
    pub fn stats(&self) -> PricingStats {
        let total_requests: u64 = self.tiers.values().map(|t| t.requests).sum();
        let accepted_requests: u64 = self.tiers.values().map(|t| t.accepted).sum();
        let total_revenue: Decimal = self.tiers.values().map(|t| t.revenue).sum();

        let tiers = self
            .tiers
            .iter()
            .map(|(tier, t)| {
                let stats = TierStats {
                    total_requests: t.requests,
                    accepted: t.accepted,
                    rejected: t.requests - t.accepted,
                    acceptance_rate: ratio(t.accepted, t.requests),
                    revenue: t.revenue,
                    avg_price_paid: per_unit(t.revenue, t.accepted),
                };
                (*tier, stats)
            })
            .collect();

        PricingStats {
            total_requests,
            accepted_requests,
            rejected_requests: total_requests - accepted_requests,
            acceptance_rate: ratio(accepted_requests, total_requests),
            total_revenue,
            revenue_per_request: per_unit(total_revenue, total_requests),
            tiers,
            prices: price_stats(&self.prices),
        }
    }

    /// Clear every running total.
    pub fn reset(&mut self) {
        self.tiers.clear();
        self.prices.clear();
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn per_unit(amount: Decimal, count: u64) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        (amount / Decimal::from(count)).round_dp(PRICE_DP)
    }
}

fn price_stats(prices: &BTreeMap<Decimal, u64>) -> PriceStats {
    let n: u64 = prices.values().sum();
    let (Some((low, _)), Some((high, _))) = (prices.first_key_value(), prices.last_key_value())
    else {
        return PriceStats::default();
    };

    let as_f64 = |price: &Decimal| price.to_f64().unwrap_or(f64::MAX);
    let count = n as f64;
    let mean = prices
        .iter()
        .map(|(price, c)| as_f64(price) * *c as f64)
        .sum::<f64>()
        / count;
    let variance = prices
        .iter()
        .map(|(price, c)| (as_f64(price) - mean).powi(2) * *c as f64)
        .sum::<f64>()
        / count;
    let lower = nth_price(prices, (n - 1) / 2);
    let upper = nth_price(prices, n / 2);
    let median = (as_f64(&lower) + as_f64(&upper)) / 2.0;

    PriceStats {
        mean,
        median,
        std: variance.sqrt(),
        min: as_f64(low),
        max: as_f64(high),
        samples: n as usize,
    }
}

/// Price at zero-based `rank` in sorted order. `rank` must be below the
/// total count.
fn nth_price(prices: &BTreeMap<Decimal, u64>, rank: u64) -> Decimal {
    let mut seen = 0;
    for (price, count) in prices {
        seen += count;
        if rank < seen {
            return *price;
        }
    }
    Decimal::ZERO
}
