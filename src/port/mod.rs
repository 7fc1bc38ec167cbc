//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`Solver`] - LP optimization backend
//! - [`Allocator`] - Per-period allocation wrapped by the adaptive controller
//! - [`WorkloadSource`] - Client lists, forecasts and requests per period
//! - [`MetricsSink`] - Per-period reports and the run summary

mod allocator;
mod metrics;
mod solver;
mod workload;

pub use allocator::Allocator;
pub use metrics::MetricsSink;
pub use solver::{LpProblem, LpSolution, LpStatus, ObjectiveSense, Solver};
pub use workload::{Period, WorkloadSource};
