//! Workload sources.

mod file;

pub use file::{ClientSpec, FileWorkload, PeriodSpec, Scenario};
