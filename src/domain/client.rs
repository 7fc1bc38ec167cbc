//! Client records with builder construction.
//!
//! A [`Client`] is created fresh each period from the workload and is
//! immutable for the rest of that period. Optional fields have defaults
//! (no hard SLA, zero willingness to pay, the balanced resource profile),
//! so single-resource callers never have to think about resource profiles.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::ClientId;
use super::resource::Resource;
use crate::error::DomainError;

/// Service tier, ordered by priority (`Free < Standard < Premium`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Standard,
    Premium,
}

impl Tier {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            other => Err(DomainError::UnknownTier(other.to_string())),
        }
    }
}

/// Per-request resource consumption and response-time tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    pub cpu_ms_per_request: f64,
    pub memory_mb_per_request: f64,
    pub network_kb_per_request: f64,
    pub max_response_time_ms: f64,
}

impl ResourceProfile {
    #[must_use]
    pub const fn new(
        cpu_ms_per_request: f64,
        memory_mb_per_request: f64,
        network_kb_per_request: f64,
        max_response_time_ms: f64,
    ) -> Self {
        Self {
            cpu_ms_per_request,
            memory_mb_per_request,
            network_kb_per_request,
            max_response_time_ms,
        }
    }

    /// Units of `resource` one request consumes. Every request consumes one
    /// unit of aggregate capacity.
    #[must_use]
    pub fn consumption(&self, resource: Resource) -> f64 {
        match resource {
            Resource::Capacity => 1.0,
            Resource::Cpu => self.cpu_ms_per_request,
            Resource::Memory => self.memory_mb_per_request,
            Resource::Network => self.network_kb_per_request,
        }
    }
}

impl Default for ResourceProfile {
    /// Balanced profile: 20ms CPU, 100MB memory, 500KB network, 200ms max RT.
    fn default() -> Self {
        Self::new(20.0, 100.0, 500.0, 200.0)
    }
}

/// An API client as seen by the allocator for one period.
///
/// Use [`Client::builder`] to construct instances; the builder validates
/// that every numeric field is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    id: ClientId,
    tier: Tier,
    weight: f64,
    min_rate: f64,
    max_willingness_to_pay: Decimal,
    demand: f64,
    profile: ResourceProfile,
}

impl Client {
    /// Create a new builder for a client with the given id and tier.
    pub fn builder(id: impl Into<ClientId>, tier: Tier) -> ClientBuilder {
        ClientBuilder::new(id.into(), tier)
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Objective coefficient in throughput mode.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Hard SLA floor; zero means no guarantee.
    pub fn min_rate(&self) -> f64 {
        self.min_rate
    }

    pub fn has_hard_sla(&self) -> bool {
        self.min_rate > 0.0
    }

    pub fn max_willingness_to_pay(&self) -> Decimal {
        self.max_willingness_to_pay
    }

    /// Requested rate; upper bound on the client's allocation.
    pub fn demand(&self) -> f64 {
        self.demand
    }

    pub fn profile(&self) -> &ResourceProfile {
        &self.profile
    }

    /// Copy of this client with a different objective weight.
    #[must_use]
    pub fn with_weight(&self, weight: f64) -> Self {
        Self {
            weight,
            ..self.clone()
        }
    }
}

/// Builder for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    id: ClientId,
    tier: Tier,
    weight: f64,
    min_rate: f64,
    max_willingness_to_pay: Decimal,
    demand: f64,
    profile: ResourceProfile,
}

impl ClientBuilder {
    fn new(id: ClientId, tier: Tier) -> Self {
        Self {
            id,
            tier,
            weight: 1.0,
            min_rate: 0.0,
            max_willingness_to_pay: Decimal::ZERO,
            demand: 0.0,
            profile: ResourceProfile::default(),
        }
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn min_rate(mut self, min_rate: f64) -> Self {
        self.min_rate = min_rate;
        self
    }

    pub fn willingness_to_pay(mut self, price: Decimal) -> Self {
        self.max_willingness_to_pay = price;
        self
    }

    pub fn demand(mut self, demand: f64) -> Self {
        self.demand = demand;
        self
    }

    pub fn profile(mut self, profile: ResourceProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, any rate, weight or profile
    /// field is negative or non-finite, or the willingness to pay is negative.
    pub fn build(self) -> Result<Client, DomainError> {
        if self.id.as_str().is_empty() {
            return Err(DomainError::EmptyClientId);
        }

        let checks = [
            ("weight", self.weight),
            ("min_rate", self.min_rate),
            ("demand", self.demand),
            ("cpu_ms_per_request", self.profile.cpu_ms_per_request),
            ("memory_mb_per_request", self.profile.memory_mb_per_request),
            ("network_kb_per_request", self.profile.network_kb_per_request),
            ("max_response_time_ms", self.profile.max_response_time_ms),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::NegativeField {
                    client: self.id.to_string(),
                    field,
                    value,
                });
            }
        }

        if self.max_willingness_to_pay < Decimal::ZERO {
            return Err(DomainError::NegativeWillingness {
                client: self.id.to_string(),
            });
        }

        Ok(Client {
            id: self.id,
            tier: self.tier,
            weight: self.weight,
            min_rate: self.min_rate,
            max_willingness_to_pay: self.max_willingness_to_pay,
            demand: self.demand,
            profile: self.profile,
        })
    }
}

/// Sum of demand across clients.
pub fn total_demand(clients: &[Client]) -> f64 {
    clients.iter().map(Client::demand).sum()
}
