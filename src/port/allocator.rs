//! Allocator port.
//!
//! The adaptive controller wraps anything that can turn a client list and a
//! capacity scale into a [`Solution`]; both the single-resource and the
//! multi-resource allocators implement it.

use crate::domain::{Client, Solution};

/// A per-period allocation solver.
pub trait Allocator {
    /// Return the allocator name for logging.
    fn name(&self) -> &'static str;

    /// Solve the period's allocation with every configured capacity scaled
    /// by `capacity_factor` (in `(0, 1]` when a robust buffer is held back).
    ///
    /// Never fails: infeasible or failed solves come back as a non-feasible
    /// [`Solution`] with zero rates.
    fn allocate(&mut self, clients: &[Client], capacity_factor: f64) -> Solution;

    /// Full demand of `clients` relative to unscaled capacity, taken over the
    /// tightest resource. 1.0 means demand exactly fills the system.
    fn demand_pressure(&self, clients: &[Client]) -> f64;

    /// Number of solves that reached the backend.
    fn solve_count(&self) -> u64;

    /// Forget the cached solution and the solve counter.
    fn reset_cache(&mut self);
}

impl<A: Allocator + ?Sized> Allocator for Box<A> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn allocate(&mut self, clients: &[Client], capacity_factor: f64) -> Solution {
        (**self).allocate(clients, capacity_factor)
    }

    fn demand_pressure(&self, clients: &[Client]) -> f64 {
        (**self).demand_pressure(clients)
    }

    fn solve_count(&self) -> u64 {
        (**self).solve_count()
    }

    fn reset_cache(&mut self) {
        (**self).reset_cache();
    }
}
