//! Implementations of ports (hexagonal adapters).

pub mod metrics;
pub mod solver;
pub mod workload;
