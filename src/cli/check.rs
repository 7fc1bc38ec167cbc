//! Handler for the `check` command.

use std::path::Path;

use crate::cli::output;
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Validate a configuration file without running anything.
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());

    let config = Config::load(path)?;
    output::ok("Configuration file is valid");

    output::section("Summary");
    match &config.resources {
        Some(resources) => output::field("Resources", resources),
        None => output::field("Capacity", format!("{} req/s", config.allocator.capacity)),
    }
    output::field("Objective", config.allocator.objective.as_str());
    output::field("Buffer", config.adaptive.robust.enable_buffer);
    output::field(
        "Time trigger",
        format!("{}s", config.adaptive.triggers.time_threshold_secs),
    );
    output::field(
        "Load trigger",
        format!("{:.0}%", config.adaptive.triggers.load_change_threshold * 100.0),
    );
    output::field("Rolling horizon", config.adaptive.rolling_horizon.enabled);
    output::field("Min price", config.pricing.min_price);
    if !config.pricing.enable_charging {
        output::warn("Charging disabled: admitted requests are not billed");
    }
    println!();

    Ok(())
}
