//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use crate::infrastructure::config::{AdaptiveConfig, AllocatorConfig};

/// Throughput allocator with the given capacity.
pub fn allocator(capacity: f64) -> AllocatorConfig {
    AllocatorConfig {
        capacity,
        ..AllocatorConfig::default()
    }
}

/// Adaptive config with the robust buffer and rolling horizon switched off,
/// so the allocator sees the nominal capacity and unmodified weights.
pub fn plain_adaptive() -> AdaptiveConfig {
    let mut config = AdaptiveConfig::default();
    config.robust.enable_buffer = false;
    config.rolling_horizon.enabled = false;
    config
}
