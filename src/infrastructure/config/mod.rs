//! Infrastructure configuration modules.

pub mod adaptive;
pub mod allocator;
pub mod logging;
pub mod pricing;
pub mod settings;

pub use adaptive::{AdaptiveConfig, RobustConfig, RollingHorizonConfig, TriggerConfig};
pub use allocator::AllocatorConfig;
pub use logging::LoggingConfig;
pub use pricing::PricingConfig;
pub use settings::{Config, SimulationConfig};
