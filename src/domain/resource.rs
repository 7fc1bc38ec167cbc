//! Resource dimensions, capacities, and per-resource shadow prices.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A dimension that a capacity constraint is written over.
///
/// `Capacity` is the aggregate request-rate budget used by the single
/// resource allocator; the remaining variants are the dimensions of the
/// multi-resource allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Aggregate requests per second.
    Capacity,
    /// CPU milliseconds per second.
    Cpu,
    /// Memory in megabytes.
    Memory,
    /// Network kilobytes per second.
    Network,
}

impl Resource {
    /// Dimensions used by the multi-resource allocator, in constraint order.
    pub const MULTI: [Resource; 3] = [Resource::Cpu, Resource::Memory, Resource::Network];

    /// Stable lowercase name for logging and constraint labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total capacity of each resource dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemResources {
    /// CPU milliseconds available per second.
    pub cpu_ms: f64,
    /// Memory available in megabytes.
    pub memory_mb: f64,
    /// Network bandwidth in kilobytes per second.
    pub network_kb: f64,
}

impl SystemResources {
    #[must_use]
    pub const fn new(cpu_ms: f64, memory_mb: f64, network_kb: f64) -> Self {
        Self {
            cpu_ms,
            memory_mb,
            network_kb,
        }
    }

    /// Capacity of a single dimension. `Capacity` has no meaning here and
    /// reports zero.
    #[must_use]
    pub fn capacity(&self, resource: Resource) -> f64 {
        match resource {
            Resource::Cpu => self.cpu_ms,
            Resource::Memory => self.memory_mb,
            Resource::Network => self.network_kb,
            Resource::Capacity => 0.0,
        }
    }

    /// Every capacity multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            cpu_ms: self.cpu_ms * factor,
            memory_mb: self.memory_mb * factor,
            network_kb: self.network_kb * factor,
        }
    }
}

impl Default for SystemResources {
    /// One CPU core, 2 GB of memory, 10 MB/s of network.
    fn default() -> Self {
        Self::new(1000.0, 2048.0, 10_000.0)
    }
}

impl fmt::Display for SystemResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU={}ms/s, MEM={}MB, NET={}KB/s",
            self.cpu_ms, self.memory_mb, self.network_kb
        )
    }
}

/// Shadow price per resource constraint.
///
/// Prices are the magnitude of the dual value: the marginal objective gain
/// of one more unit of that resource. Resources absent from the map have a
/// price of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DualPrices(BTreeMap<Resource, f64>);

impl DualPrices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All listed resources priced at zero.
    #[must_use]
    pub fn zero(resources: &[Resource]) -> Self {
        Self(resources.iter().map(|r| (*r, 0.0)).collect())
    }

    pub fn set(&mut self, resource: Resource, price: f64) {
        self.0.insert(resource, price);
    }

    #[must_use]
    pub fn get(&self, resource: Resource) -> f64 {
        self.0.get(&resource).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, f64)> + '_ {
        self.0.iter().map(|(r, p)| (*r, *p))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exponential moving average: `alpha * self + (1 - alpha) * previous`,
    /// taken per resource over the union of both key sets.
    #[must_use]
    pub fn smoothed(&self, previous: &DualPrices, alpha: f64) -> DualPrices {
        let mut out = previous.clone();
        for (resource, raw) in self.iter() {
            let prev = previous.get(resource);
            out.set(resource, alpha * raw + (1.0 - alpha) * prev);
        }
        for (resource, prev) in previous.iter() {
            if !self.0.contains_key(&resource) {
                out.set(resource, (1.0 - alpha) * prev);
            }
        }
        out
    }
}

impl FromIterator<(Resource, f64)> for DualPrices {
    fn from_iter<I: IntoIterator<Item = (Resource, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
