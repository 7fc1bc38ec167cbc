//! Single-resource allocator.
//!
//! Solves the per-period allocation against one aggregate capacity. The
//! dual of the capacity row is the system-wide congestion price.

use std::sync::Arc;

use tracing::info;

use super::lp::{self, CapacityRow};
use crate::domain::{Client, ObjectiveKind, Resource, Solution, TierPrices};
use crate::error::ConfigError;
use crate::infrastructure::config::AllocatorConfig;
use crate::port::{Allocator, Solver};

/// LP-based rate allocator over one aggregate capacity.
pub struct ResourceAllocator {
    capacity: f64,
    objective: ObjectiveKind,
    tier_prices: TierPrices,
    solver: Arc<dyn Solver>,
    previous: Option<Solution>,
    solve_count: u64,
}

impl ResourceAllocator {
    /// Create an allocator from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity or tier prices are out of range.
    pub fn new(config: &AllocatorConfig, solver: Arc<dyn Solver>) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            capacity = config.capacity,
            objective = config.objective.as_str(),
            solver = solver.name(),
            "Resource allocator ready"
        );
        Ok(Self {
            capacity: config.capacity,
            objective: config.objective,
            tier_prices: config.tier_prices,
            solver,
            previous: None,
            solve_count: 0,
        })
    }

    /// Nominal capacity in requests per second.
    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    #[must_use]
    pub fn objective(&self) -> ObjectiveKind {
        self.objective
    }

    /// Check whether `clients` can be served within `capacity` at all.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the hard-SLA floors exceed the
    /// capacity or a client's floor exceeds its own demand.
    pub fn check_feasibility(&self, clients: &[Client], capacity: f64) -> Result<(), String> {
        lp::precheck(clients, &[CapacityRow::new(Resource::Capacity, capacity)])
    }

    /// Solve the allocation of `clients` within `capacity`.
    ///
    /// Infeasible floors are caught before the backend is called. Every
    /// failure yields a zero allocation with the status recorded.
    pub fn solve(&mut self, clients: &[Client], capacity: f64) -> Solution {
        let rows = [CapacityRow::new(Resource::Capacity, capacity)];
        let (solution, reached_backend) =
            lp::solve(self.solver.as_ref(), clients, &rows, self.objective, &self.tier_prices);

        if reached_backend {
            self.solve_count += 1;
        }
        if solution.is_feasible() {
            self.previous = Some(solution.clone());
        }
        solution
    }

    /// Most recent feasible solution.
    #[must_use]
    pub fn previous(&self) -> Option<&Solution> {
        self.previous.as_ref()
    }
}

impl Allocator for ResourceAllocator {
    fn name(&self) -> &'static str {
        "single_resource"
    }

    fn allocate(&mut self, clients: &[Client], capacity_factor: f64) -> Solution {
        self.solve(clients, self.capacity * capacity_factor)
    }

    fn demand_pressure(&self, clients: &[Client]) -> f64 {
        lp::demand_pressure(clients, &[CapacityRow::new(Resource::Capacity, self.capacity)])
    }

    fn solve_count(&self) -> u64 {
        self.solve_count
    }

    fn reset_cache(&mut self) {
        self.previous = None;
        self.solve_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::solver::HiGHSSolver;
    use crate::domain::{SolveStatus, Tier};
    use rust_decimal_macros::dec;

    fn allocator(capacity: f64, objective: ObjectiveKind) -> ResourceAllocator {
        let config = AllocatorConfig {
            capacity,
            objective,
            ..AllocatorConfig::default()
        };
        ResourceAllocator::new(&config, Arc::new(HiGHSSolver::new())).unwrap()
    }

    fn client(id: &str, tier: Tier, weight: f64, min_rate: f64, demand: f64) -> Client {
        Client::builder(id, tier)
            .weight(weight)
            .min_rate(min_rate)
            .demand(demand)
            .willingness_to_pay(dec!(0.10))
            .build()
            .unwrap()
    }

    #[test]
    fn rejects_non_positive_capacity() {
        let config = AllocatorConfig {
            capacity: 0.0,
            ..AllocatorConfig::default()
        };
        assert!(ResourceAllocator::new(&config, Arc::new(HiGHSSolver::new())).is_err());
    }

    #[test]
    fn uncongested_clients_get_full_demand() {
        let mut alloc = allocator(100.0, ObjectiveKind::Throughput);
        let clients = vec![
            client("premium", Tier::Premium, 10.0, 30.0, 50.0),
            client("standard", Tier::Standard, 5.0, 0.0, 40.0),
        ];
        let solution = alloc.solve(&clients, 100.0);

        assert!(solution.is_feasible());
        assert!((solution.rate(&"premium".into()) - 50.0).abs() < 1e-6);
        assert!((solution.rate(&"standard".into()) - 40.0).abs() < 1e-6);
        assert!(solution.dual_price(Resource::Capacity).abs() < 1e-6);
        assert_eq!(alloc.solve_count(), 1);
        assert!(alloc.previous().is_some());
    }

    #[test]
    fn congestion_prices_capacity_at_marginal_weight() {
        let mut alloc = allocator(100.0, ObjectiveKind::Throughput);
        let clients = vec![
            client("premium", Tier::Premium, 10.0, 30.0, 50.0),
            client("standard", Tier::Standard, 5.0, 0.0, 80.0),
        ];
        let solution = alloc.solve(&clients, 100.0);

        assert!(solution.is_feasible());
        assert!((solution.rate(&"premium".into()) - 50.0).abs() < 1e-6);
        assert!((solution.rate(&"standard".into()) - 50.0).abs() < 1e-6);
        assert!((solution.dual_price(Resource::Capacity) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn revenue_objective_prefers_expensive_tiers() {
        let mut alloc = allocator(50.0, ObjectiveKind::Revenue);
        let clients = vec![
            client("free", Tier::Free, 100.0, 0.0, 50.0),
            client("premium", Tier::Premium, 1.0, 0.0, 50.0),
        ];
        let solution = alloc.solve(&clients, 50.0);

        assert!((solution.rate(&"premium".into()) - 50.0).abs() < 1e-6);
        assert!(solution.rate(&"free".into()).abs() < 1e-6);
    }

    #[test]
    fn infeasible_floors_skip_the_backend() {
        let mut alloc = allocator(100.0, ObjectiveKind::Throughput);
        let clients = vec![
            client("a", Tier::Premium, 1.0, 60.0, 80.0),
            client("b", Tier::Premium, 1.0, 60.0, 80.0),
        ];
        let solution = alloc.solve(&clients, 100.0);

        assert_eq!(solution.status(), SolveStatus::Infeasible);
        assert_eq!(solution.rates(), vec![0.0, 0.0]);
        assert_eq!(alloc.solve_count(), 0);
        assert!(alloc.previous().is_none());
    }

    #[test]
    fn capacity_factor_scales_capacity() {
        let mut alloc = allocator(100.0, ObjectiveKind::Throughput);
        let clients = vec![client("a", Tier::Standard, 1.0, 0.0, 200.0)];
        let solution = alloc.allocate(&clients, 0.8);
        assert!((solution.total_rate() - 80.0).abs() < 1e-6);
    }

    #[test]
    fn reset_cache_clears_bookkeeping() {
        let mut alloc = allocator(100.0, ObjectiveKind::Throughput);
        alloc.solve(&[client("a", Tier::Free, 1.0, 0.0, 10.0)], 100.0);
        alloc.reset_cache();
        assert_eq!(alloc.solve_count(), 0);
        assert!(alloc.previous().is_none());
    }

    #[test]
    fn pressure_is_demand_over_nominal_capacity() {
        let alloc = allocator(100.0, ObjectiveKind::Throughput);
        let clients = vec![client("a", Tier::Free, 1.0, 0.0, 150.0)];
        assert!((alloc.demand_pressure(&clients) - 1.5).abs() < 1e-12);
    }
}
