//! Multi-resource allocator.
//!
//! Extends the allocation LP with one capacity row per resource dimension
//! (CPU, memory, network). Each row yields its own shadow price, and a
//! client's effective price is the consumption-weighted sum of them.
//!
//! Response times are estimated after solving with an M/M/1-style queueing
//! approximation:
//!
//! ```text
//! RT_i = s_i + s_i * u / (1 - u),   u = min(cpu_load / cpu_capacity, 0.95)
//! ```
//!
//! where `s_i` is the client's CPU time per request. The estimate is
//! reported, not enforced; see [`Solution::response_time_violations`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::lp::{self, CapacityRow};
use crate::domain::{Client, ObjectiveKind, Resource, Solution, SystemResources, TierPrices};
use crate::error::ConfigError;
use crate::infrastructure::config::allocator::validate_resources;
use crate::infrastructure::config::AllocatorConfig;
use crate::port::{Allocator, Solver};

const MAX_CPU_UTILIZATION: f64 = 0.95;

/// LP-based rate allocator over CPU, memory, and network capacities.
pub struct MultiResourceAllocator {
    resources: SystemResources,
    objective: ObjectiveKind,
    tier_prices: TierPrices,
    solver: Arc<dyn Solver>,
    previous: Option<Solution>,
    solve_count: u64,
}

fn rows(resources: &SystemResources) -> [CapacityRow; 3] {
    Resource::MULTI.map(|r| CapacityRow::new(r, resources.capacity(r)))
}

impl MultiResourceAllocator {
    /// Create an allocator for `resources`. The objective and tier prices
    /// come from the allocator section; its scalar capacity is unused.
    ///
    /// # Errors
    ///
    /// Returns an error if any capacity is not positive or a tier price is
    /// negative.
    pub fn new(
        resources: SystemResources,
        config: &AllocatorConfig,
        solver: Arc<dyn Solver>,
    ) -> Result<Self, ConfigError> {
        validate_resources(&resources)?;
        config.validate()?;
        info!(
            resources = %resources,
            objective = config.objective.as_str(),
            solver = solver.name(),
            "Multi-resource allocator ready"
        );
        Ok(Self {
            resources,
            objective: config.objective,
            tier_prices: config.tier_prices,
            solver,
            previous: None,
            solve_count: 0,
        })
    }

    /// Nominal system capacities.
    #[must_use]
    pub fn system_resources(&self) -> &SystemResources {
        &self.resources
    }

    /// Estimated response time of one request from `client` when the
    /// system carries `cpu_load` ms of CPU work per second on `cpu_capacity`.
    #[must_use]
    pub fn estimate_response_time(client: &Client, cpu_load: f64, cpu_capacity: f64) -> f64 {
        let service_time = client.profile().cpu_ms_per_request;
        let utilization = if cpu_capacity > 0.0 {
            (cpu_load / cpu_capacity).min(MAX_CPU_UTILIZATION)
        } else {
            MAX_CPU_UTILIZATION
        };
        service_time + service_time * utilization / (1.0 - utilization)
    }

    /// Check whether `clients` can be served within `resources` at all.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason naming the first resource whose
    /// hard-SLA load exceeds its capacity, or a client whose floor exceeds
    /// its own demand.
    pub fn check_feasibility(
        &self,
        clients: &[Client],
        resources: &SystemResources,
    ) -> Result<(), String> {
        lp::precheck(clients, &rows(resources))
    }

    /// Solve the allocation of `clients` within `resources`.
    ///
    /// Utilisation and response times are measured against `resources`.
    pub fn solve(&mut self, clients: &[Client], resources: &SystemResources) -> Solution {
        let rows = rows(resources);
        let (solution, reached_backend) =
            lp::solve(self.solver.as_ref(), clients, &rows, self.objective, &self.tier_prices);

        if reached_backend {
            self.solve_count += 1;
        }
        if !solution.is_feasible() {
            return solution;
        }

        let cpu_load: f64 = clients
            .iter()
            .map(|c| solution.rate(c.id()) * c.profile().cpu_ms_per_request)
            .sum();
        let response_times: BTreeMap<_, _> = clients
            .iter()
            .map(|c| {
                (
                    c.id().clone(),
                    Self::estimate_response_time(c, cpu_load, resources.cpu_ms),
                )
            })
            .collect();

        let solution = solution.with_response_times(response_times);
        let late = solution.response_time_violations(clients);
        if !late.is_empty() {
            warn!(
                clients = late.len(),
                "Estimated response time exceeds tolerance"
            );
        }

        self.previous = Some(solution.clone());
        solution
    }

    /// Most recent feasible solution.
    #[must_use]
    pub fn previous(&self) -> Option<&Solution> {
        self.previous.as_ref()
    }
}

impl Allocator for MultiResourceAllocator {
    fn name(&self) -> &'static str {
        "multi_resource"
    }

    fn allocate(&mut self, clients: &[Client], capacity_factor: f64) -> Solution {
        let scaled = self.resources.scaled(capacity_factor);
        self.solve(clients, &scaled)
    }

    fn demand_pressure(&self, clients: &[Client]) -> f64 {
        lp::demand_pressure(clients, &rows(&self.resources))
    }

    fn solve_count(&self) -> u64 {
        self.solve_count
    }

    fn reset_cache(&mut self) {
        self.previous = None;
        self.solve_count = 0;
    }
}
