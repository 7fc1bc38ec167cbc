//! Workload source port.

use std::time::Duration;

use crate::domain::{Client, Request};
use crate::error::Result;

/// Everything the workload supplies for one period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Period {
    /// Offset of this period from the start of the run.
    pub timestamp: Duration,
    /// Clients and their demand for this period.
    pub clients: Vec<Client>,
    /// Forecast client lists for the following periods, nearest first.
    pub forecast: Vec<Vec<Client>>,
    /// Explicit requests to admit. When empty the simulation samples
    /// requests from client demand.
    pub requests: Vec<Request>,
}

/// Supplies periods to the simulation loop in timestamp order.
pub trait WorkloadSource {
    /// Return the next period, or `None` when the workload is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot produce a valid period.
    fn next_period(&mut self) -> Result<Option<Period>>;
}
