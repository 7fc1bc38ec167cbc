//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for clients, requests, and the reference scenarios.
//! - [`solver`] - Solver doubles: `RecordingSolver`, `FailingSolver`.
//! - [`workload`] - `ScriptedWorkload` and `RecordingSink` for driving a
//!   [`Simulation`](crate::application::Simulation).
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod domain;
pub mod solver;
pub mod workload;
