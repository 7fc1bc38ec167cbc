//! Metrics sink port.

use crate::domain::{PeriodReport, RunSummary};
use crate::error::Result;

/// Receives what the core emits; persistence and printing live behind it.
pub trait MetricsSink {
    /// Record one period.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    fn record(&mut self, report: &PeriodReport) -> Result<()>;

    /// Record the end-of-run summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary cannot be written.
    fn finish(&mut self, summary: &RunSummary) -> Result<()>;
}
