//! JSON scenario files.
//!
//! A scenario lists periods in order. Each period carries its clients, an
//! optional forecast of the following periods' clients, and optional
//! explicit requests:
//!
//! ```json
//! {
//!   "periods": [
//!     {
//!       "timestamp": 0.0,
//!       "clients": [
//!         { "id": "acme", "tier": "premium", "weight": 10, "min_rate": 30,
//!           "willingness_to_pay": "0.50", "demand": 50 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! A period without a timestamp is placed one period length after the
//! previous one. The length is the scenario's `period_length_secs` when it
//! sets one, otherwise the default passed to
//! [`FileWorkload::with_default_period_length`] (10 s unless overridden).

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Client, Request, ResourceProfile, Tier};
use crate::error::{Error, Result};
use crate::port::{Period, WorkloadSource};

const fn default_weight() -> f64 {
    1.0
}

const DEFAULT_PERIOD_LENGTH: Duration = Duration::from_secs(10);

/// A client as written in a scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSpec {
    pub id: String,
    pub tier: Tier,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub min_rate: f64,
    #[serde(default)]
    pub willingness_to_pay: Decimal,
    #[serde(default)]
    pub demand: f64,
    #[serde(default)]
    pub profile: Option<ResourceProfile>,
}

impl ClientSpec {
    /// Validate and build the domain client.
    ///
    /// # Errors
    ///
    /// Returns a domain error for an empty id or a negative field.
    pub fn build(&self) -> Result<Client> {
        let mut builder = Client::builder(self.id.as_str(), self.tier)
            .weight(self.weight)
            .min_rate(self.min_rate)
            .willingness_to_pay(self.willingness_to_pay)
            .demand(self.demand);
        if let Some(profile) = self.profile {
            builder = builder.profile(profile);
        }
        Ok(builder.build()?)
    }
}

/// One period as written in a scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodSpec {
    /// Seconds from the start of the run.
    #[serde(default)]
    pub timestamp: Option<f64>,
    pub clients: Vec<ClientSpec>,
    #[serde(default)]
    pub forecast: Vec<Vec<ClientSpec>>,
    #[serde(default)]
    pub requests: Vec<Request>,
}

/// A whole scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub period_length_secs: Option<f64>,
    pub periods: Vec<PeriodSpec>,
}

fn build_clients(specs: &[ClientSpec]) -> Result<Vec<Client>> {
    specs.iter().map(ClientSpec::build).collect()
}

/// Workload read from a JSON scenario, served period by period.
#[derive(Debug)]
pub struct FileWorkload {
    periods: VecDeque<PeriodSpec>,
    period_length: Option<Duration>,
    default_period_length: Duration,
    next_timestamp: Duration,
    served: usize,
}

impl FileWorkload {
    /// Parse a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the period length is
    /// not a positive number of seconds.
    pub fn from_json(content: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(content)?;
        Self::from_scenario(scenario)
    }

    /// Read a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serve an already parsed scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the period length is not a positive number of
    /// seconds.
    pub fn from_scenario(scenario: Scenario) -> Result<Self> {
        let period_length = scenario
            .period_length_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .ok()
                    .filter(|d| !d.is_zero())
                    .ok_or_else(|| {
                        Error::Workload(format!(
                            "period_length_secs must be positive, got {secs}"
                        ))
                    })
            })
            .transpose()?;
        Ok(Self {
            periods: scenario.periods.into(),
            period_length,
            default_period_length: DEFAULT_PERIOD_LENGTH,
            next_timestamp: Duration::ZERO,
            served: 0,
        })
    }

    /// Period length used when the scenario does not set its own.
    #[must_use]
    pub fn with_default_period_length(mut self, length: Duration) -> Self {
        self.default_period_length = length;
        self
    }

    /// Spacing between periods that carry no timestamp.
    #[must_use]
    pub fn period_length(&self) -> Duration {
        self.period_length.unwrap_or(self.default_period_length)
    }

    /// Periods not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.periods.len()
    }
}

impl WorkloadSource for FileWorkload {
    fn next_period(&mut self) -> Result<Option<Period>> {
        let Some(spec) = self.periods.pop_front() else {
            return Ok(None);
        };

        let timestamp = match spec.timestamp {
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|e| {
                Error::Workload(format!("period {}: bad timestamp {secs}: {e}", self.served))
            })?,
            None => self.next_timestamp,
        };
        self.next_timestamp = timestamp.saturating_add(self.period_length());
        self.served += 1;

        let clients = build_clients(&spec.clients)?;
        let forecast = spec
            .forecast
            .iter()
            .map(|future| build_clients(future))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            period = self.served - 1,
            clients = clients.len(),
            forecast = forecast.len(),
            requests = spec.requests.len(),
            "Loaded period"
        );

        Ok(Some(Period {
            timestamp,
            clients,
            forecast,
            requests: spec.requests,
        }))
    }
}
