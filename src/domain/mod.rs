//! Value types for rate allocation and admission control.

mod client;
mod ids;
mod objective;
mod report;
mod request;
mod resource;
mod solution;

pub mod constraint;
pub mod fairness;

pub use client::{total_demand, Client, ClientBuilder, ResourceProfile, Tier};
pub use fairness::FairnessMetrics;
pub use ids::ClientId;
pub use objective::{ObjectiveKind, TierPrices};
pub use report::{
    AdaptiveStats, PeriodReport, PriceStats, PricingStats, RunSummary, TierStats,
};
pub use request::{Request, RequestDecision, RequestOutcome};
pub use resource::{DualPrices, Resource, SystemResources};
pub use solution::{Allocation, SolveStatus, Solution};
