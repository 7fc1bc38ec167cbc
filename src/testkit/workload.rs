//! Workload and metrics doubles for driving a simulation in tests.

use std::collections::VecDeque;
use std::time::Duration;

use crate::domain::{Client, PeriodReport, RunSummary};
use crate::error::Result;
use crate::port::{MetricsSink, Period, WorkloadSource};

/// A workload serving pre-built periods in order.
#[derive(Debug, Default)]
pub struct ScriptedWorkload {
    periods: VecDeque<Period>,
}

impl ScriptedWorkload {
    pub fn new(periods: Vec<Period>) -> Self {
        Self {
            periods: periods.into(),
        }
    }

    /// One period per client list, `step_secs` apart starting at zero.
    pub fn from_clients(lists: Vec<Vec<Client>>, step_secs: u64) -> Self {
        let periods = lists
            .into_iter()
            .enumerate()
            .map(|(i, clients)| Period {
                timestamp: Duration::from_secs(i as u64 * step_secs),
                clients,
                ..Period::default()
            })
            .collect();
        Self::new(periods)
    }
}

impl WorkloadSource for ScriptedWorkload {
    fn next_period(&mut self) -> Result<Option<Period>> {
        Ok(self.periods.pop_front())
    }
}

/// Sink keeping everything in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub reports: Vec<PeriodReport>,
    pub summary: Option<RunSummary>,
}

impl MetricsSink for RecordingSink {
    fn record(&mut self, report: &PeriodReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}
