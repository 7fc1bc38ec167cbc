//! Adaptive re-optimization around an allocator.
//!
//! The controller decides each period whether to re-solve or serve the
//! cached solution, holds back a robust capacity buffer sized from recent
//! demand volatility, biases weights toward forecast pressure, and smooths
//! the dual prices it hands out.
//!
//! Resolve triggers are checked in a fixed order:
//!
//! 1. first call: `initial`
//! 2. time since the last resolve reached the threshold: `time`
//! 3. total demand moved by at least the load threshold: `load_change`
//! 4. otherwise: `cached`

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::fairness::{mean, std_dev};
use crate::domain::{total_demand, AdaptiveStats, Client, DualPrices, Solution};
use crate::error::ConfigError;
use crate::infrastructure::config::AdaptiveConfig;
use crate::port::Allocator;

const PRICE_HISTORY_LEN: usize = 20;
const MAX_BUFFER_RATE: f64 = 0.25;
const VOLATILITY_BUFFER_SCALE: f64 = 0.5;
const MIN_CAPACITY_FACTOR: f64 = 0.70;
const PRESSURE_WEIGHT_BOOST: f64 = 0.2;

/// Why a period was re-solved or served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveReason {
    Initial,
    Time,
    LoadChange,
    Cached,
}

impl ResolveReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Time => "time",
            Self::LoadChange => "load_change",
            Self::Cached => "cached",
        }
    }

    #[must_use]
    pub const fn is_resolve(&self) -> bool {
        !matches!(self, Self::Cached)
    }
}

impl fmt::Display for ResolveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// History and cache owned by one controller.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveState {
    demand_history: VecDeque<f64>,
    price_history: VecDeque<DualPrices>,
    last_resolve: Option<Duration>,
    last_total_demand: f64,
    last_dual_prices: DualPrices,
    smoothed_prices: Option<DualPrices>,
    cached: Option<Solution>,
    total_decisions: u64,
    skipped_solves: u64,
    triggered_by_time: u64,
    triggered_by_load: u64,
}

impl AdaptiveState {
    /// Recent per-period total demand, oldest first.
    pub fn demand_history(&self) -> impl Iterator<Item = f64> + '_ {
        self.demand_history.iter().copied()
    }

    pub fn last_resolve(&self) -> Option<Duration> {
        self.last_resolve
    }

    pub fn last_total_demand(&self) -> f64 {
        self.last_total_demand
    }

    /// Raw dual prices of the most recent resolve.
    pub fn last_dual_prices(&self) -> &DualPrices {
        &self.last_dual_prices
    }

    pub fn smoothed_prices(&self) -> Option<&DualPrices> {
        self.smoothed_prices.as_ref()
    }

    /// Solution served by the most recent period.
    pub fn cached(&self) -> Option<&Solution> {
        self.cached.as_ref()
    }

    fn push_demand(&mut self, demand: f64, limit: usize) {
        self.demand_history.push_back(demand);
        while self.demand_history.len() > limit {
            self.demand_history.pop_front();
        }
    }

    fn push_prices(&mut self, prices: DualPrices) {
        self.price_history.push_back(prices);
        while self.price_history.len() > PRICE_HISTORY_LEN {
            self.price_history.pop_front();
        }
    }

    fn price_volatility(&self) -> DualPrices {
        if self.price_history.len() < 2 {
            return self
                .price_history
                .back()
                .map(|p| p.iter().map(|(r, _)| (r, 0.0)).collect())
                .unwrap_or_default();
        }
        let resources: Vec<_> = self
            .price_history
            .iter()
            .flat_map(|p| p.iter().map(|(r, _)| r))
            .collect();
        resources
            .into_iter()
            .map(|r| {
                let samples: Vec<f64> = self.price_history.iter().map(|p| p.get(r)).collect();
                (r, std_dev(&samples))
            })
            .collect()
    }
}

/// Outcome of one [`AdaptiveController::step`].
#[derive(Debug, Clone)]
pub struct AdaptiveStep {
    /// Solution to serve this period, carrying smoothed dual prices.
    ///
    /// When no feasible allocation exists the rates are zero while the
    /// prices are the EMA of earlier prices blended with zero.
    pub solution: Solution,
    pub reason: ResolveReason,
    /// Share of nominal capacity offered to the allocator.
    pub capacity_factor: f64,
}

/// History-aware wrapper deciding when to re-solve.
pub struct AdaptiveController<A: Allocator> {
    allocator: A,
    config: AdaptiveConfig,
    state: AdaptiveState,
}

impl<A: Allocator> AdaptiveController<A> {
    /// Wrap `allocator`.
    ///
    /// # Errors
    ///
    /// Returns an error if any adaptive setting is out of range.
    pub fn new(allocator: A, config: AdaptiveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            allocator = allocator.name(),
            buffer = config.robust.enable_buffer,
            lookback = config.robust.lookback_periods,
            time_threshold_secs = config.triggers.time_threshold_secs,
            load_change_threshold = config.triggers.load_change_threshold,
            rolling_horizon = config.rolling_horizon.enabled,
            "Adaptive controller ready"
        );
        Ok(Self {
            allocator,
            config,
            state: AdaptiveState::default(),
        })
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    pub fn state(&self) -> &AdaptiveState {
        &self.state
    }

    /// Decide whether `clients` at `now` warrant a fresh solve.
    ///
    /// Pure: counters are only updated by [`step`](Self::step).
    #[must_use]
    pub fn should_resolve(&self, clients: &[Client], now: Duration) -> (bool, ResolveReason) {
        let Some(last) = self.state.last_resolve else {
            return (true, ResolveReason::Initial);
        };

        if now.saturating_sub(last) >= self.config.triggers.time_threshold() {
            return (true, ResolveReason::Time);
        }

        let last_demand = self.state.last_total_demand;
        if last_demand > 0.0 {
            let change = (total_demand(clients) - last_demand).abs() / last_demand;
            if change >= self.config.triggers.load_change_threshold {
                return (true, ResolveReason::LoadChange);
            }
        }

        (false, ResolveReason::Cached)
    }

    /// Share of nominal capacity to offer the allocator, in `[0.70, 1]`.
    ///
    /// With buffering enabled and at least two demand samples, the held-back
    /// share is `max(min_buffer_rate, min(0.25, cv / 2))` where `cv` is the
    /// coefficient of variation of the demand history.
    #[must_use]
    pub fn capacity_factor(&self) -> f64 {
        let robust = &self.config.robust;
        if !robust.enable_buffer || self.state.demand_history.len() < 2 {
            return 1.0;
        }

        let history: Vec<f64> = self.state.demand_history.iter().copied().collect();
        let mean_demand = mean(&history);
        let buffer_rate = if mean_demand > 0.0 {
            let cv = std_dev(&history) / mean_demand;
            robust
                .min_buffer_rate
                .max((cv * VOLATILITY_BUFFER_SCALE).min(MAX_BUFFER_RATE))
        } else {
            robust.min_buffer_rate
        };

        (1.0 - buffer_rate).max(MIN_CAPACITY_FACTOR)
    }

    /// `base_capacity` after the robust buffer is held back.
    #[must_use]
    pub fn effective_capacity(&self, base_capacity: f64) -> f64 {
        base_capacity * self.capacity_factor()
    }

    /// Mean demand pressure over the configured look-ahead, or `None` when
    /// the rolling horizon is disabled or no forecast is usable.
    #[must_use]
    pub fn forecast_pressure(&self, forecast: Option<&[Vec<Client>]>) -> Option<f64> {
        let horizon = &self.config.rolling_horizon;
        if !horizon.enabled {
            return None;
        }
        let pressures: Vec<f64> = forecast?
            .iter()
            .take(horizon.num_periods)
            .map(|clients| self.allocator.demand_pressure(clients))
            .collect();
        if pressures.is_empty() {
            return None;
        }
        Some(mean(&pressures))
    }

    /// Clients with weights raised by `1 + 0.2 * max(0, pressure - 1)`.
    fn horizon_adjusted(clients: &[Client], pressure: f64) -> Vec<Client> {
        let boost = 1.0 + PRESSURE_WEIGHT_BOOST * (pressure - 1.0).max(0.0);
        clients
            .iter()
            .map(|c| c.with_weight(c.weight() * boost))
            .collect()
    }

    /// Advance one period: record demand, then re-solve or serve the cache.
    pub fn step(
        &mut self,
        clients: &[Client],
        now: Duration,
        forecast: Option<&[Vec<Client>]>,
    ) -> AdaptiveStep {
        let demand = total_demand(clients);
        self.state
            .push_demand(demand, self.config.robust.lookback_periods);
        self.state.total_decisions += 1;

        let (resolve, reason) = self.should_resolve(clients, now);
        let capacity_factor = self.capacity_factor();

        if !resolve {
            if let Some(cached) = &self.state.cached {
                self.state.skipped_solves += 1;
                debug!(demand, "Serving cached allocation");
                return AdaptiveStep {
                    solution: cached.clone(),
                    reason,
                    capacity_factor,
                };
            }
        }

        match reason {
            ResolveReason::Time => self.state.triggered_by_time += 1,
            ResolveReason::LoadChange => self.state.triggered_by_load += 1,
            _ => {}
        }

        let solution = match self.forecast_pressure(forecast) {
            Some(pressure) => {
                debug!(pressure, "Adjusting weights for forecast pressure");
                let adjusted = Self::horizon_adjusted(clients, pressure);
                self.allocator.allocate(&adjusted, capacity_factor)
            }
            None => self.allocator.allocate(clients, capacity_factor),
        };

        let raw = solution.dual_prices().clone();
        let smoothed = match &self.state.smoothed_prices {
            Some(previous) => raw.smoothed(previous, self.config.ema_alpha),
            None => raw.clone(),
        };

        info!(
            reason = reason.as_str(),
            demand,
            capacity_factor,
            status = %solution.status(),
            "Re-solved allocation"
        );

        self.state.last_resolve = Some(now);
        self.state.last_total_demand = demand;
        self.state.last_dual_prices = raw.clone();
        self.state.push_prices(raw);
        self.state.smoothed_prices = Some(smoothed.clone());

        let solution = solution.with_dual_prices(smoothed);
        self.state.cached = Some(solution.clone());

        AdaptiveStep {
            solution,
            reason,
            capacity_factor,
        }
    }

    /// Counters and price statistics so far.
    #[must_use]
    pub fn stats(&self) -> AdaptiveStats {
        let state = &self.state;
        AdaptiveStats {
            total_solves: self.allocator.solve_count(),
            total_decisions: state.total_decisions,
            skipped_solves: state.skipped_solves,
            skip_rate: if state.total_decisions > 0 {
                state.skipped_solves as f64 / state.total_decisions as f64
            } else {
                0.0
            },
            triggered_by_time: state.triggered_by_time,
            triggered_by_load: state.triggered_by_load,
            smoothed_prices: state.smoothed_prices.clone(),
            price_volatility: state.price_volatility(),
            demand_history_size: state.demand_history.len(),
        }
    }

    /// Forget all history, the cache, and the counters, including the
    /// allocator's own.
    pub fn reset(&mut self) {
        self.state = AdaptiveState::default();
        self.allocator.reset_cache();
    }
}
