//! Allocation solutions produced by the allocators.
//!
//! A [`Solution`] is produced once per re-optimization and never mutated;
//! the next re-optimization supersedes it. Every non-feasible solution an
//! allocator returns carries zero rates and zero duals so callers can keep
//! serving from it. [`Solution::with_dual_prices`] may later attach
//! non-zero prices to such a solution; its rates stay zero.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::client::{Client, ResourceProfile};
use super::ids::ClientId;
use super::resource::{DualPrices, Resource};

/// How a solve terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// The backend found an optimal allocation.
    Optimal,
    /// No allocation satisfies the constraints, either detected by the
    /// local pre-check or reported by the backend.
    Infeasible,
    /// The backend failed or stopped with a non-optimal status.
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optimal => "optimal",
            Self::Infeasible => "infeasible",
            Self::Error => "error",
        })
    }
}

/// Rate allocated to one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub client_id: ClientId,
    pub rate: f64,
}

/// Result of one allocation solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    allocations: Vec<Allocation>,
    dual_prices: DualPrices,
    sla_duals: BTreeMap<ClientId, f64>,
    objective: f64,
    status: SolveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    solve_time_ms: f64,
    sla_headroom: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    utilization: BTreeMap<Resource, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    response_times_ms: BTreeMap<ClientId, f64>,
}

impl Solution {
    /// An optimal solution straight from the backend.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn optimal(
        allocations: Vec<Allocation>,
        dual_prices: DualPrices,
        sla_duals: BTreeMap<ClientId, f64>,
        objective: f64,
        solve_time: Duration,
        sla_headroom: f64,
    ) -> Self {
        Self {
            allocations,
            dual_prices,
            sla_duals,
            objective,
            status: SolveStatus::Optimal,
            reason: None,
            solve_time_ms: solve_time.as_secs_f64() * 1000.0,
            sla_headroom,
            utilization: BTreeMap::new(),
            response_times_ms: BTreeMap::new(),
        }
    }

    /// The safe zero allocation returned for infeasible or failed solves.
    pub(crate) fn unsolved(
        clients: &[Client],
        resources: &[Resource],
        status: SolveStatus,
        reason: impl Into<String>,
        solve_time: Duration,
        sla_headroom: f64,
    ) -> Self {
        Self {
            allocations: clients
                .iter()
                .map(|c| Allocation {
                    client_id: c.id().clone(),
                    rate: 0.0,
                })
                .collect(),
            dual_prices: DualPrices::zero(resources),
            sla_duals: BTreeMap::new(),
            objective: 0.0,
            status,
            reason: Some(reason.into()),
            solve_time_ms: solve_time.as_secs_f64() * 1000.0,
            sla_headroom: sla_headroom.min(0.0),
            utilization: resources.iter().map(|r| (*r, 0.0)).collect(),
            response_times_ms: BTreeMap::new(),
        }
    }

    pub(crate) fn with_utilization(mut self, utilization: BTreeMap<Resource, f64>) -> Self {
        self.utilization = utilization;
        self
    }

    pub(crate) fn with_response_times(mut self, response_times: BTreeMap<ClientId, f64>) -> Self {
        self.response_times_ms = response_times;
        self
    }

    /// Copy of this solution with its dual prices replaced.
    #[must_use]
    pub fn with_dual_prices(&self, dual_prices: DualPrices) -> Self {
        Self {
            dual_prices,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Why the solution is not feasible, if it is not.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// Allocated rate for a client; zero for unknown clients.
    pub fn rate(&self, id: &ClientId) -> f64 {
        self.allocations
            .iter()
            .find(|a| &a.client_id == id)
            .map_or(0.0, |a| a.rate)
    }

    /// Allocated rates in client order.
    pub fn rates(&self) -> Vec<f64> {
        self.allocations.iter().map(|a| a.rate).collect()
    }

    pub fn total_rate(&self) -> f64 {
        self.allocations.iter().map(|a| a.rate).sum()
    }

    pub fn dual_prices(&self) -> &DualPrices {
        &self.dual_prices
    }

    /// Shadow price of one resource constraint.
    pub fn dual_price(&self, resource: Resource) -> f64 {
        self.dual_prices.get(resource)
    }

    /// Dual value of each client's hard-SLA floor.
    pub fn sla_duals(&self) -> &BTreeMap<ClientId, f64> {
        &self.sla_duals
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn solve_time_ms(&self) -> f64 {
        self.solve_time_ms
    }

    /// Fraction of the tightest resource left once every hard-SLA floor is
    /// reserved. Never positive for a non-feasible solution.
    pub fn sla_headroom(&self) -> f64 {
        self.sla_headroom
    }

    /// Used fraction of each resource.
    pub fn utilization(&self) -> &BTreeMap<Resource, f64> {
        &self.utilization
    }

    /// Estimated response time per client (multi-resource solutions only).
    pub fn response_times_ms(&self) -> &BTreeMap<ClientId, f64> {
        &self.response_times_ms
    }

    /// Resource-weighted shadow price of one request from `client`:
    /// `Σ_r consumption(client, r) * dual_price(r)`.
    ///
    /// For single-resource solutions this is the capacity dual itself.
    pub fn price_for(&self, client: &Client) -> f64 {
        self.price_for_profile(client.profile())
    }

    /// Composite price of one request with the given consumption profile.
    pub fn price_for_profile(&self, profile: &ResourceProfile) -> f64 {
        self.dual_prices
            .iter()
            .map(|(resource, price)| profile.consumption(resource) * price)
            .sum()
    }

    /// Clients whose estimated response time exceeds their tolerance.
    pub fn response_time_violations(&self, clients: &[Client]) -> Vec<ClientId> {
        clients
            .iter()
            .filter(|c| {
                self.response_times_ms
                    .get(c.id())
                    .is_some_and(|rt| *rt > c.profile().max_response_time_ms)
            })
            .map(|c| c.id().clone())
            .collect()
    }
}
