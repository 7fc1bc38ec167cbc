//! Allocation LP shared by the single- and multi-resource allocators.
//!
//! Both allocators solve the same program and differ only in which capacity
//! rows they add:
//!
//! ```text
//! maximize   Σ c_i * r_i
//! subject to Σ r_i * consumption(i, k) <= capacity_k   for every row k
//!            r_i >= min_rate_i                         for every hard SLA
//!            0 <= r_i <= demand_i
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::constraint::{Constraint, VariableBounds};
use crate::domain::{
    Allocation, Client, ClientId, DualPrices, ObjectiveKind, Resource, SolveStatus, Solution,
    TierPrices,
};
use crate::port::{LpProblem, LpStatus, Solver};

/// One capacity constraint row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CapacityRow {
    pub resource: Resource,
    pub capacity: f64,
}

impl CapacityRow {
    pub(crate) const fn new(resource: Resource, capacity: f64) -> Self {
        Self { resource, capacity }
    }

    fn reserved(&self, clients: &[Client]) -> f64 {
        clients
            .iter()
            .map(|c| c.min_rate() * c.profile().consumption(self.resource))
            .sum()
    }

    fn load(&self, clients: &[Client], rates: &[f64]) -> f64 {
        clients
            .iter()
            .zip(rates)
            .map(|(c, r)| r * c.profile().consumption(self.resource))
            .sum()
    }
}

/// Reason the hard-SLA floors cannot be met, without calling a backend.
pub(crate) fn precheck(clients: &[Client], rows: &[CapacityRow]) -> Result<(), String> {
    for row in rows {
        let reserved = row.reserved(clients);
        if reserved > row.capacity {
            return Err(match row.resource {
                Resource::Capacity => format!(
                    "hard SLA requirements ({reserved:.2} req/s) exceed capacity ({:.2} req/s)",
                    row.capacity
                ),
                resource => format!(
                    "hard SLA requirements need {reserved:.2} {} but only {:.2} is available",
                    resource.as_str(),
                    row.capacity
                ),
            });
        }
    }

    if let Some(client) = clients.iter().find(|c| c.min_rate() > c.demand()) {
        return Err(format!(
            "client {} has min_rate ({:.2}) greater than demand ({:.2})",
            client.id(),
            client.min_rate(),
            client.demand()
        ));
    }

    Ok(())
}

/// Fraction of the tightest row left once every hard-SLA floor is reserved.
pub(crate) fn sla_headroom(clients: &[Client], rows: &[CapacityRow]) -> f64 {
    rows.iter()
        .map(|row| {
            let reserved = row.reserved(clients);
            if row.capacity > 0.0 {
                (row.capacity - reserved) / row.capacity
            } else if reserved > 0.0 {
                -1.0
            } else {
                0.0
            }
        })
        .fold(f64::INFINITY, f64::min)
        .min(1.0)
}

/// Sum of demand over capacity on the tightest row. Zero capacity with
/// positive demand reports infinite pressure.
pub(crate) fn demand_pressure(clients: &[Client], rows: &[CapacityRow]) -> f64 {
    rows.iter()
        .map(|row| {
            let demand: f64 = clients
                .iter()
                .map(|c| c.demand() * c.profile().consumption(row.resource))
                .sum();
            if row.capacity > 0.0 {
                demand / row.capacity
            } else if demand > 0.0 {
                f64::INFINITY
            } else {
                0.0
            }
        })
        .fold(0.0, f64::max)
}

/// Per-row utilisation of a rate vector.
pub(crate) fn utilization(
    clients: &[Client],
    rates: &[f64],
    rows: &[CapacityRow],
) -> BTreeMap<Resource, f64> {
    rows.iter()
        .map(|row| {
            let util = if row.capacity > 0.0 {
                row.load(clients, rates) / row.capacity
            } else {
                0.0
            };
            (row.resource, util)
        })
        .collect()
}

fn build_problem(
    clients: &[Client],
    rows: &[CapacityRow],
    objective: ObjectiveKind,
    prices: &TierPrices,
) -> (LpProblem, Vec<ClientId>) {
    let n = clients.len();
    let mut problem = LpProblem::maximize(n);

    problem.objective = clients
        .iter()
        .map(|c| objective.coefficient(c, prices))
        .collect();
    problem.bounds = clients
        .iter()
        .map(|c| VariableBounds::bounded(0.0, c.demand()))
        .collect();

    for row in rows {
        let coefficients = clients
            .iter()
            .map(|c| c.profile().consumption(row.resource))
            .collect();
        problem
            .constraints
            .push(Constraint::leq(coefficients, row.capacity));
    }

    let mut sla_clients = Vec::new();
    for (i, client) in clients.iter().enumerate().filter(|(_, c)| c.has_hard_sla()) {
        problem
            .constraints
            .push(Constraint::floor(n, i, client.min_rate()));
        sla_clients.push(client.id().clone());
    }

    (problem, sla_clients)
}

/// Formulate, pre-check and solve one allocation problem.
///
/// Never fails: a violated pre-check, an infeasible backend result, or a
/// backend error all yield [`Solution::unsolved`]. The second return value
/// is `true` when the backend was invoked.
pub(crate) fn solve(
    solver: &dyn Solver,
    clients: &[Client],
    rows: &[CapacityRow],
    objective: ObjectiveKind,
    prices: &TierPrices,
) -> (Solution, bool) {
    let start = Instant::now();
    let resources: Vec<Resource> = rows.iter().map(|r| r.resource).collect();
    let headroom = sla_headroom(clients, rows);

    if let Err(reason) = precheck(clients, rows) {
        warn!(reason = %reason, clients = clients.len(), "Allocation infeasible by construction");
        let solution = Solution::unsolved(
            clients,
            &resources,
            SolveStatus::Infeasible,
            reason,
            start.elapsed(),
            headroom,
        );
        return (solution, false);
    }

    let (problem, sla_clients) = build_problem(clients, rows, objective, prices);

    let lp = match solver.solve_lp(&problem) {
        Ok(lp) => lp,
        Err(e) => {
            warn!(solver = solver.name(), error = %e, "Solver backend failed");
            let solution = Solution::unsolved(
                clients,
                &resources,
                SolveStatus::Error,
                e.to_string(),
                start.elapsed(),
                headroom,
            );
            return (solution, true);
        }
    };

    if !lp.is_optimal() {
        let (status, reason) = match lp.status {
            LpStatus::Infeasible => (SolveStatus::Infeasible, "backend reported infeasible"),
            LpStatus::Unbounded => (SolveStatus::Error, "backend reported unbounded"),
            _ => (SolveStatus::Error, "backend stopped without a solution"),
        };
        warn!(solver = solver.name(), status = %status, "Allocation not optimal");
        let solution = Solution::unsolved(
            clients,
            &resources,
            status,
            reason,
            start.elapsed(),
            headroom,
        );
        return (solution, true);
    }

    let rates: Vec<f64> = clients
        .iter()
        .zip(&lp.values)
        .map(|(c, v)| v.clamp(0.0, c.demand()))
        .collect();

    let dual_prices: DualPrices = rows
        .iter()
        .zip(&lp.duals)
        .map(|(row, d)| (row.resource, d.abs()))
        .collect();
    let sla_duals: BTreeMap<ClientId, f64> = sla_clients
        .into_iter()
        .zip(lp.duals.iter().skip(rows.len()))
        .map(|(id, d)| (id, d.abs()))
        .collect();

    let util = utilization(clients, &rates, rows);
    let allocations = clients
        .iter()
        .zip(&rates)
        .map(|(c, r)| Allocation {
            client_id: c.id().clone(),
            rate: *r,
        })
        .collect();

    let elapsed = start.elapsed();
    debug!(
        solver = solver.name(),
        clients = clients.len(),
        objective = lp.objective,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "Allocation solved"
    );

    let solution = Solution::optimal(
        allocations,
        dual_prices,
        sla_duals,
        lp.objective,
        elapsed,
        headroom,
    )
    .with_utilization(util);
    (solution, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResourceProfile, Tier};

    fn client(id: &str, min_rate: f64, demand: f64) -> Client {
        Client::builder(id, Tier::Premium)
            .min_rate(min_rate)
            .demand(demand)
            .build()
            .unwrap()
    }

    #[test]
    fn precheck_rejects_floors_above_capacity() {
        let clients = vec![client("a", 60.0, 80.0), client("b", 60.0, 80.0)];
        let rows = [CapacityRow::new(Resource::Capacity, 100.0)];
        let reason = precheck(&clients, &rows).unwrap_err();
        assert!(reason.contains("exceed capacity"));
    }

    #[test]
    fn precheck_allows_floors_equal_to_capacity() {
        let clients = vec![client("a", 50.0, 80.0), client("b", 50.0, 80.0)];
        let rows = [CapacityRow::new(Resource::Capacity, 100.0)];
        assert!(precheck(&clients, &rows).is_ok());
    }

    #[test]
    fn precheck_rejects_floor_above_own_demand() {
        let clients = vec![client("a", 30.0, 10.0)];
        let rows = [CapacityRow::new(Resource::Capacity, 100.0)];
        let reason = precheck(&clients, &rows).unwrap_err();
        assert!(reason.contains("greater than demand"));
    }

    #[test]
    fn precheck_weighs_floors_by_consumption() {
        let heavy = Client::builder("a", Tier::Premium)
            .min_rate(10.0)
            .demand(10.0)
            .profile(ResourceProfile::new(200.0, 1.0, 1.0, 500.0))
            .build()
            .unwrap();
        let rows = [
            CapacityRow::new(Resource::Cpu, 1000.0),
            CapacityRow::new(Resource::Memory, 1000.0),
        ];
        let reason = precheck(&[heavy], &rows).unwrap_err();
        assert!(reason.contains("cpu"));
    }

    #[test]
    fn headroom_is_share_left_after_floors() {
        let clients = vec![client("a", 30.0, 50.0)];
        let rows = [CapacityRow::new(Resource::Capacity, 100.0)];
        assert!((sla_headroom(&clients, &rows) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn headroom_without_floors_is_full() {
        let clients = vec![client("a", 0.0, 50.0)];
        let rows = [CapacityRow::new(Resource::Capacity, 100.0)];
        assert_eq!(sla_headroom(&clients, &rows), 1.0);
    }

    #[test]
    fn pressure_uses_tightest_row() {
        let c = Client::builder("a", Tier::Free)
            .demand(10.0)
            .profile(ResourceProfile::new(50.0, 10.0, 10.0, 200.0))
            .build()
            .unwrap();
        let rows = [
            CapacityRow::new(Resource::Cpu, 250.0),
            CapacityRow::new(Resource::Memory, 1000.0),
        ];
        assert!((demand_pressure(&[c], &rows) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn problem_has_one_row_per_capacity_and_floor() {
        let clients = vec![client("a", 30.0, 50.0), client("b", 0.0, 40.0)];
        let rows = [CapacityRow::new(Resource::Capacity, 100.0)];
        let (problem, sla) = build_problem(
            &clients,
            &rows,
            ObjectiveKind::Throughput,
            &TierPrices::default(),
        );

        assert_eq!(problem.constraints.len(), 2);
        assert_eq!(problem.constraints[0].coefficients, vec![1.0, 1.0]);
        assert_eq!(problem.constraints[1].coefficients, vec![1.0, 0.0]);
        assert_eq!(problem.constraints[1].rhs, 30.0);
        assert_eq!(problem.bounds[1].upper, Some(40.0));
        assert_eq!(sla, vec![ClientId::new("a")]);
    }
}
