//! Application layer.
//!
//! Allocation, adaptive re-optimization, admission pricing, and the
//! simulation loop that drives them.
//!
//! # Submodules
//!
//! - [`allocator`] - Single-resource LP allocator
//! - [`multi_resource`] - CPU/memory/network LP allocator
//! - [`adaptive`] - Resolve triggers, robust buffer, price smoothing
//! - [`pricing`] - Dual-price admission control
//! - [`simulation`] - Period loop

pub mod adaptive;
pub mod allocator;
mod lp;
pub mod multi_resource;
pub mod pricing;
pub mod simulation;

pub use adaptive::{AdaptiveController, AdaptiveState, AdaptiveStep, ResolveReason};
pub use allocator::ResourceAllocator;
pub use multi_resource::MultiResourceAllocator;
pub use pricing::PricingController;
pub use simulation::Simulation;
