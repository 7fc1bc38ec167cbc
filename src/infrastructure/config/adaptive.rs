//! Adaptive controller configuration.
//!
//! Controls the robust capacity buffer, the re-optimization triggers, the
//! rolling-horizon look-ahead, and dual-price smoothing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_true() -> bool {
    true
}

fn default_buffer_percentile() -> f64 {
    0.95
}

const fn default_lookback_periods() -> usize {
    10
}

fn default_min_buffer_rate() -> f64 {
    0.05
}

fn default_time_threshold_secs() -> f64 {
    10.0
}

fn default_load_change_threshold() -> f64 {
    0.20
}

fn default_price_change_threshold() -> f64 {
    0.30
}

const fn default_num_periods() -> usize {
    3
}

fn default_discount_factor() -> f64 {
    0.8
}

fn default_period_length_secs() -> f64 {
    10.0
}

fn default_ema_alpha() -> f64 {
    0.3
}

/// Robust capacity buffer configuration.
///
/// A share of capacity is held back in proportion to recent demand
/// volatility, so bursts do not immediately violate the allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobustConfig {
    /// Hold back a volatility-sized buffer. Defaults to true.
    #[serde(default = "default_true")]
    pub enable_buffer: bool,

    /// Demand percentile the buffer is meant to cover. Defaults to 0.95.
    #[serde(default = "default_buffer_percentile")]
    pub buffer_percentile: f64,

    /// Number of past period totals kept for volatility. Defaults to 10.
    #[serde(default = "default_lookback_periods")]
    pub lookback_periods: usize,

    /// Smallest buffer fraction once enough history exists. Defaults to 0.05.
    #[serde(default = "default_min_buffer_rate")]
    pub min_buffer_rate: f64,
}

impl Default for RobustConfig {
    fn default() -> Self {
        Self {
            enable_buffer: true,
            buffer_percentile: default_buffer_percentile(),
            lookback_periods: default_lookback_periods(),
            min_buffer_rate: default_min_buffer_rate(),
        }
    }
}

/// Re-optimization trigger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Re-solve when this many seconds passed since the last solve.
    /// Defaults to 10.
    #[serde(default = "default_time_threshold_secs")]
    pub time_threshold_secs: f64,

    /// Re-solve when total demand moved by at least this fraction.
    /// Defaults to 0.20.
    #[serde(default = "default_load_change_threshold")]
    pub load_change_threshold: f64,

    /// Relative price movement considered significant. Defaults to 0.30.
    #[serde(default = "default_price_change_threshold")]
    pub price_change_threshold: f64,
}

impl TriggerConfig {
    /// Time threshold as a [`Duration`], saturating at [`Duration::MAX`].
    #[must_use]
    pub fn time_threshold(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_threshold_secs).unwrap_or(Duration::MAX)
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            time_threshold_secs: default_time_threshold_secs(),
            load_change_threshold: default_load_change_threshold(),
            price_change_threshold: default_price_change_threshold(),
        }
    }
}

/// Rolling-horizon look-ahead configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingHorizonConfig {
    /// Use forecasts when the workload supplies them. Defaults to true.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Forecast periods averaged into the demand pressure. Defaults to 3.
    #[serde(default = "default_num_periods")]
    pub num_periods: usize,

    /// Weight decay for later periods. Defaults to 0.8.
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f64,

    /// Seconds per period for scenarios that do not set their own.
    /// Defaults to 10.
    #[serde(default = "default_period_length_secs")]
    pub period_length_secs: f64,
}

impl RollingHorizonConfig {
    /// Period length as a [`Duration`], saturating at [`Duration::MAX`].
    #[must_use]
    pub fn period_length(&self) -> Duration {
        Duration::try_from_secs_f64(self.period_length_secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RollingHorizonConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            num_periods: default_num_periods(),
            discount_factor: default_discount_factor(),
            period_length_secs: default_period_length_secs(),
        }
    }
}

/// Adaptive controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// Smoothing factor for the dual-price EMA. Defaults to 0.3.
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,

    #[serde(default)]
    pub robust: RobustConfig,

    #[serde(default)]
    pub triggers: TriggerConfig,

    #[serde(default)]
    pub rolling_horizon: RollingHorizonConfig,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            ema_alpha: default_ema_alpha(),
            robust: RobustConfig::default(),
            triggers: TriggerConfig::default(),
            rolling_horizon: RollingHorizonConfig::default(),
        }
    }
}

fn in_open_closed_unit(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

fn is_positive_duration(secs: f64) -> bool {
    secs > 0.0 && Duration::try_from_secs_f64(secs).is_ok()
}

impl AdaptiveConfig {
    /// Validate every range of the adaptive configuration.
    ///
    /// # Errors
    ///
    /// Returns the first field found outside its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !in_open_closed_unit(self.ema_alpha) {
            return Err(ConfigError::invalid("ema_alpha", "must be in (0, 1]"));
        }

        let robust = &self.robust;
        if robust.lookback_periods < 2 {
            return Err(ConfigError::invalid("lookback_periods", "must be at least 2"));
        }
        if !(0.0..1.0).contains(&robust.min_buffer_rate) {
            return Err(ConfigError::invalid("min_buffer_rate", "must be in [0, 1)"));
        }
        if !(robust.buffer_percentile > 0.0 && robust.buffer_percentile < 1.0) {
            return Err(ConfigError::invalid("buffer_percentile", "must be in (0, 1)"));
        }

        let triggers = &self.triggers;
        if !is_positive_duration(triggers.time_threshold_secs) {
            return Err(ConfigError::invalid(
                "time_threshold_secs",
                "must be a positive number of seconds",
            ));
        }
        if !in_open_closed_unit(triggers.load_change_threshold) {
            return Err(ConfigError::invalid(
                "load_change_threshold",
                "must be in (0, 1]",
            ));
        }
        if !in_open_closed_unit(triggers.price_change_threshold) {
            return Err(ConfigError::invalid(
                "price_change_threshold",
                "must be in (0, 1]",
            ));
        }

        let horizon = &self.rolling_horizon;
        if !in_open_closed_unit(horizon.discount_factor) {
            return Err(ConfigError::invalid("discount_factor", "must be in (0, 1]"));
        }
        if !is_positive_duration(horizon.period_length_secs) {
            return Err(ConfigError::invalid(
                "period_length_secs",
                "must be a positive number of seconds",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = AdaptiveConfig::default();
        assert_eq!(config.ema_alpha, 0.3);
        assert_eq!(config.robust.lookback_periods, 10);
        assert_eq!(config.robust.min_buffer_rate, 0.05);
        assert_eq!(config.triggers.time_threshold(), Duration::from_secs(10));
        assert_eq!(config.triggers.load_change_threshold, 0.20);
        assert_eq!(config.rolling_horizon.num_periods, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn time_threshold_beyond_duration_range_is_rejected() {
        let mut config = AdaptiveConfig::default();
        config.triggers.time_threshold_secs = 1e20;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "time_threshold_secs",
                ..
            })
        ));
        assert_eq!(config.triggers.time_threshold(), Duration::MAX);
    }

    #[test]
    fn lookback_below_two_is_rejected() {
        let mut config = AdaptiveConfig::default();
        config.robust.lookback_periods = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "lookback_periods",
                ..
            })
        ));
    }

    #[test]
    fn min_buffer_rate_of_one_is_rejected() {
        let mut config = AdaptiveConfig::default();
        config.robust.min_buffer_rate = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_load_threshold_is_rejected() {
        let mut config = AdaptiveConfig::default();
        config.triggers.load_change_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_threshold_of_one_is_allowed() {
        let mut config = AdaptiveConfig::default();
        config.triggers.load_change_threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_alpha_is_rejected() {
        let config = AdaptiveConfig {
            ema_alpha: 0.0,
            ..AdaptiveConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_time_threshold_is_rejected() {
        let mut config = AdaptiveConfig::default();
        config.triggers.time_threshold_secs = -1.0;
        assert!(config.validate().is_err());
    }
}
