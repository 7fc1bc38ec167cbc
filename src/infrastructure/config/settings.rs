//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates every section of the
//! TOML file. Every range is checked at load time so a bad file is rejected
//! before any controller is built.
//!
//! # Example
//!
//! ```no_run
//! use ratewise::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("ratewise.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::adaptive::AdaptiveConfig;
use super::allocator::{validate_resources, AllocatorConfig};
use super::logging::LoggingConfig;
use super::pricing::PricingConfig;
use crate::domain::SystemResources;
use crate::error::{ConfigError, Result};

const fn default_request_sample() -> u32 {
    10
}

const fn default_max_requests_per_client() -> u32 {
    10_000
}

/// Simulation driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Rate units per synthesized request when a period lists no explicit
    /// requests. Defaults to 10.
    #[serde(default = "default_request_sample")]
    pub request_sample: u32,

    /// Upper bound on synthesized requests per client and period.
    /// Defaults to 10000.
    #[serde(default = "default_max_requests_per_client")]
    pub max_requests_per_client: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            request_sample: default_request_sample(),
            max_requests_per_client: default_max_requests_per_client(),
        }
    }
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Single-resource capacity, objective, and tier prices.
    #[serde(default)]
    pub allocator: AllocatorConfig,

    /// Per-resource capacities.
    ///
    /// When present, the multi-resource allocator is used instead of the
    /// single aggregate capacity.
    #[serde(default)]
    pub resources: Option<SystemResources>,

    /// Adaptive re-optimization settings.
    #[serde(default)]
    pub adaptive: AdaptiveConfig,

    /// Admission pricing settings.
    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or any value is
    /// outside its valid range.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<()> {
        self.allocator.validate()?;
        if let Some(resources) = &self.resources {
            validate_resources(resources)?;
        }
        self.adaptive.validate()?;
        self.pricing.validate()?;
        if self.simulation.request_sample == 0 {
            return Err(ConfigError::invalid("request_sample", "must be greater than 0").into());
        }
        if self.simulation.max_requests_per_client == 0 {
            return Err(ConfigError::invalid(
                "max_requests_per_client",
                "must be greater than 0",
            )
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
