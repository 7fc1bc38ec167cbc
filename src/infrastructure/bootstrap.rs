//! Composition root: wires configuration into a runnable simulation.

use std::sync::Arc;

use tracing::info;

use crate::adapter::solver::HiGHSSolver;
use crate::application::{
    AdaptiveController, MultiResourceAllocator, PricingController, ResourceAllocator, Simulation,
};
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::{Allocator, Solver};

/// Simulation over whichever allocator the configuration selects.
pub type DynSimulation = Simulation<Box<dyn Allocator>>;

/// Build the allocator: multi-resource when `[resources]` is configured,
/// single aggregate capacity otherwise.
///
/// # Errors
///
/// Returns an error if the allocator settings are out of range.
pub fn build_allocator(config: &Config, solver: Arc<dyn Solver>) -> Result<Box<dyn Allocator>> {
    let allocator: Box<dyn Allocator> = match config.resources {
        Some(resources) => Box::new(MultiResourceAllocator::new(
            resources,
            &config.allocator,
            solver,
        )?),
        None => Box::new(ResourceAllocator::new(&config.allocator, solver)?),
    };
    Ok(allocator)
}

/// Build a simulation with the given backend.
///
/// # Errors
///
/// Returns an error if any controller rejects its configuration section.
pub fn build_simulation_with(config: &Config, solver: Arc<dyn Solver>) -> Result<DynSimulation> {
    let allocator = build_allocator(config, solver)?;
    info!(allocator = allocator.name(), "Building simulation");
    let adaptive = AdaptiveController::new(allocator, config.adaptive.clone())?;
    let pricing = PricingController::new(config.pricing.clone())?;
    Ok(Simulation::new(adaptive, pricing, &config.simulation))
}

/// Build a simulation backed by HiGHS.
///
/// # Errors
///
/// Returns an error if any controller rejects its configuration section.
pub fn build_simulation(config: &Config) -> Result<DynSimulation> {
    build_simulation_with(config, Arc::new(HiGHSSolver::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SystemResources;

    #[test]
    fn default_config_uses_single_resource() {
        let sim = build_simulation(&Config::default()).unwrap();
        assert_eq!(sim.adaptive().allocator().name(), "single_resource");
    }

    #[test]
    fn resources_section_selects_multi_resource() {
        let config = Config {
            resources: Some(SystemResources::default()),
            ..Config::default()
        };
        let sim = build_simulation(&config).unwrap();
        assert_eq!(sim.adaptive().allocator().name(), "multi_resource");
    }
}
