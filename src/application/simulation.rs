//! Period-driven simulation loop.
//!
//! Each period runs the adaptive controller, admits every request at its
//! client's composite price, evaluates fairness, and emits a
//! [`PeriodReport`] to the metrics sink.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::adaptive::AdaptiveController;
use super::pricing::PricingController;
use crate::domain::{
    fairness, Client, ClientId, PeriodReport, Request, ResourceProfile, RunSummary,
};
use crate::error::Result;
use crate::infrastructure::config::SimulationConfig;
use crate::port::{Allocator, MetricsSink, Period, WorkloadSource};

/// One adaptive controller and one pricing controller driven period by
/// period.
pub struct Simulation<A: Allocator> {
    adaptive: AdaptiveController<A>,
    pricing: PricingController,
    request_sample: u32,
    max_requests_per_client: u32,
    periods: u64,
    infeasible_periods: u64,
    jains_total: f64,
}

impl<A: Allocator> Simulation<A> {
    /// Zero sampling values in `config` are treated as one.
    pub fn new(
        adaptive: AdaptiveController<A>,
        pricing: PricingController,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            adaptive,
            pricing,
            request_sample: config.request_sample.max(1),
            max_requests_per_client: config.max_requests_per_client.max(1),
            periods: 0,
            infeasible_periods: 0,
            jains_total: 0.0,
        }
    }

    pub fn adaptive(&self) -> &AdaptiveController<A> {
        &self.adaptive
    }

    pub fn pricing(&self) -> &PricingController {
        &self.pricing
    }

    /// Requests for `period`: the explicit list, or `floor(demand / sample)`
    /// requests per client when none are listed, capped at
    /// `max_requests_per_client`.
    #[must_use]
    pub fn requests_for(&self, period: &Period) -> Vec<Request> {
        if !period.requests.is_empty() {
            return period.requests.clone();
        }
        let sample = f64::from(self.request_sample);
        let cap = f64::from(self.max_requests_per_client);
        period
            .clients
            .iter()
            .flat_map(|client| {
                let count = (client.demand() / sample).floor().min(cap) as usize;
                std::iter::repeat_with(|| Request::from_client(client, period.timestamp))
                    .take(count)
            })
            .collect()
    }

    /// Run one period.
    pub fn step(&mut self, period: &Period) -> PeriodReport {
        let forecast = (!period.forecast.is_empty()).then_some(period.forecast.as_slice());
        let step = self
            .adaptive
            .step(&period.clients, period.timestamp, forecast);
        let solution = step.solution;

        if !solution.is_feasible() {
            self.infeasible_periods += 1;
            warn!(
                period = self.periods,
                status = %solution.status(),
                reason = solution.reason().unwrap_or_default(),
                "Serving zero allocation"
            );
        }

        let by_id: HashMap<&ClientId, &Client> =
            period.clients.iter().map(|c| (c.id(), c)).collect();
        let default_profile = ResourceProfile::default();
        let headroom = solution.sla_headroom();

        let mut accepted = 0;
        let mut rejected = 0;
        let mut revenue = Decimal::ZERO;
        for request in self.requests_for(period) {
            let price = match by_id.get(&request.client_id) {
                Some(client) => solution.price_for(client),
                None => solution.price_for_profile(&default_profile),
            };
            let outcome = self.pricing.process(&request, price, headroom);
            if outcome.decision.is_accepted() {
                accepted += 1;
                revenue += outcome.charge;
            } else {
                rejected += 1;
            }
        }

        let fairness = fairness::evaluate(&period.clients, &solution);
        self.jains_total += fairness.jains_index;

        let report = PeriodReport {
            period: self.periods,
            timestamp_secs: period.timestamp.as_secs_f64(),
            reason: step.reason.as_str().to_string(),
            capacity_factor: step.capacity_factor,
            solution,
            fairness,
            accepted,
            rejected,
            revenue,
            pricing: self.pricing.stats(),
        };
        self.periods += 1;
        report
    }

    /// Drain `workload`, recording every period and the final summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the workload cannot be read or the sink cannot
    /// be written. Infeasible periods are not errors.
    pub fn run<W, M>(&mut self, workload: &mut W, sink: &mut M) -> Result<RunSummary>
    where
        W: WorkloadSource + ?Sized,
        M: MetricsSink + ?Sized,
    {
        while let Some(period) = workload.next_period()? {
            let report = self.step(&period);
            sink.record(&report)?;
        }

        let summary = self.summary();
        sink.finish(&summary)?;
        info!(
            periods = summary.periods,
            infeasible = summary.infeasible_periods,
            solves = summary.adaptive.total_solves,
            revenue = %summary.pricing.total_revenue,
            "Simulation finished"
        );
        Ok(summary)
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            periods: self.periods,
            infeasible_periods: self.infeasible_periods,
            mean_jains_index: if self.periods > 0 {
                self.jains_total / self.periods as f64
            } else {
                0.0
            },
            adaptive: self.adaptive.stats(),
            pricing: self.pricing.stats(),
        }
    }

    /// Reset both controllers and the run counters for an independent run.
    pub fn reset(&mut self) {
        self.adaptive.reset();
        self.pricing.reset();
        self.periods = 0;
        self.infeasible_periods = 0;
        self.jains_total = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::adapter::solver::HiGHSSolver;
    use crate::application::ResourceAllocator;
    use crate::domain::Tier;
    use crate::infrastructure::config::{AdaptiveConfig, AllocatorConfig, PricingConfig};
    use rust_decimal_macros::dec;

    fn simulation() -> Simulation<ResourceAllocator> {
        let allocator =
            ResourceAllocator::new(&AllocatorConfig::default(), Arc::new(HiGHSSolver::new()))
                .unwrap();
        let adaptive = AdaptiveController::new(allocator, AdaptiveConfig::default()).unwrap();
        let pricing = PricingController::new(PricingConfig::default()).unwrap();
        Simulation::new(adaptive, pricing, &SimulationConfig::default())
    }

    fn period(secs: u64, demand: f64) -> Period {
        Period {
            timestamp: Duration::from_secs(secs),
            clients: vec![Client::builder("a", Tier::Standard)
                .demand(demand)
                .willingness_to_pay(dec!(0.05))
                .build()
                .unwrap()],
            ..Period::default()
        }
    }

    #[test]
    fn requests_are_sampled_from_demand() {
        let sim = simulation();
        assert_eq!(sim.requests_for(&period(0, 35.0)).len(), 3);
        assert!(sim.requests_for(&period(0, 9.0)).is_empty());
    }

    #[test]
    fn synthesized_requests_are_capped_per_client() {
        let sim = simulation();
        assert_eq!(sim.requests_for(&period(0, 1e13)).len(), 10_000);
    }

    #[test]
    fn explicit_requests_take_precedence() {
        let sim = simulation();
        let mut p = period(0, 100.0);
        p.requests = vec![Request::from_client(&p.clients[0], Duration::ZERO)];
        assert_eq!(sim.requests_for(&p).len(), 1);
    }

    #[test]
    fn uncongested_period_charges_floor() {
        let mut sim = simulation();
        let report = sim.step(&period(0, 50.0));

        assert_eq!(report.reason, "initial");
        assert_eq!(report.accepted, 5);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.revenue, dec!(0.05));
        assert_eq!(report.fairness.jains_index, 1.0);
    }

    #[test]
    fn summary_counts_periods() {
        let mut sim = simulation();
        sim.step(&period(0, 50.0));
        sim.step(&period(1, 50.0));

        let summary = sim.summary();
        assert_eq!(summary.periods, 2);
        assert_eq!(summary.infeasible_periods, 0);
        assert_eq!(summary.adaptive.total_decisions, 2);
        assert_eq!(summary.pricing.total_requests, 10);

        sim.reset();
        assert_eq!(sim.summary().periods, 0);
        assert_eq!(sim.summary().pricing.total_requests, 0);
    }
}
