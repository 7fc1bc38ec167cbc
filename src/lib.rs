//! Ratewise - dual-price rate limiting and admission control.
//!
//! Each period the allocator solves a small linear program that splits
//! capacity between API clients, honouring hard-SLA floors. The dual value
//! of each capacity constraint is the congestion price of that resource,
//! and individual requests are admitted when the client is willing to pay
//! it.
//!
//! # Architecture
//!
//! - **`domain`** - Clients, solutions, dual prices, requests, fairness
//! - **`port`** - Traits at the seams: `Solver`, `Allocator`,
//!   `WorkloadSource`, `MetricsSink`
//! - **`adapter`** - HiGHS backend, JSON scenario files, JSON-lines output
//! - **`application`** - Allocators, adaptive controller, pricing
//!   controller, simulation loop
//! - **`infrastructure`** - TOML configuration, logging, wiring
//!
//! # Features
//!
//! - `testkit` - Test builders and solver doubles for integration tests
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ratewise::adapter::solver::HiGHSSolver;
//! use ratewise::application::ResourceAllocator;
//! use ratewise::domain::{Client, Resource, Tier};
//! use ratewise::infrastructure::config::AllocatorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut allocator =
//!     ResourceAllocator::new(&AllocatorConfig::default(), Arc::new(HiGHSSolver::new()))?;
//! let clients = vec![Client::builder("acme", Tier::Premium)
//!     .weight(10.0)
//!     .min_rate(30.0)
//!     .demand(50.0)
//!     .build()?];
//!
//! let solution = allocator.solve(&clients, 100.0);
//! println!("price: {}", solution.dual_price(Resource::Capacity));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
