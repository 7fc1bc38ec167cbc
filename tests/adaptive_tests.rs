//! Adaptive controller integration tests with a real allocator.

mod support;

use std::sync::Arc;
use std::time::Duration;

use ratewise::application::{AdaptiveController, ResolveReason, ResourceAllocator};
use ratewise::domain::{Client, Resource};
use ratewise::infrastructure::config::AdaptiveConfig;
use ratewise::port::Allocator;
use ratewise::testkit::config::{allocator, plain_adaptive};
use ratewise::testkit::domain::{make_clients, scenario_b};
use ratewise::testkit::solver::RecordingSolver;

use support::assert_near;

fn controller(config: AdaptiveConfig) -> (AdaptiveController<ResourceAllocator>, RecordingSolver) {
    let solver = RecordingSolver::new();
    let alloc = ResourceAllocator::new(&allocator(100.0), Arc::new(solver.clone()))
        .expect("valid allocator config");
    let ctl = AdaptiveController::new(alloc, config).expect("valid adaptive config");
    (ctl, solver)
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[test]
fn first_step_always_solves() {
    let (mut ctl, solver) = controller(plain_adaptive());
    let step = ctl.step(&scenario_b(), secs(0), None);

    assert_eq!(step.reason, ResolveReason::Initial);
    assert!(step.solution.is_feasible());
    assert_eq!(solver.calls(), 1);
}

#[test]
fn steady_demand_is_served_from_cache() {
    let (mut ctl, solver) = controller(plain_adaptive());
    let clients = scenario_b();

    let first = ctl.step(&clients, secs(0), None);
    let second = ctl.step(&clients, secs(5), None);

    assert_eq!(second.reason, ResolveReason::Cached);
    assert_eq!(second.solution, first.solution);
    assert_eq!(solver.calls(), 1);

    let stats = ctl.stats();
    assert_eq!(stats.total_decisions, 2);
    assert_eq!(stats.skipped_solves, 1);
    assert_eq!(stats.total_solves, 1);
    assert_near(stats.skip_rate, 0.5, 1e-12);
}

#[test]
fn time_trigger_takes_precedence_over_load() {
    let (mut ctl, _) = controller(plain_adaptive());
    ctl.step(&make_clients(4, 10.0), secs(0), None);

    // Both triggers hold; the time trigger is reported.
    let step = ctl.step(&make_clients(4, 30.0), secs(10), None);
    assert_eq!(step.reason, ResolveReason::Time);

    let stats = ctl.stats();
    assert_eq!(stats.triggered_by_time, 1);
    assert_eq!(stats.triggered_by_load, 0);
}

#[test]
fn load_change_triggers_before_time_threshold() {
    let (mut ctl, solver) = controller(plain_adaptive());
    ctl.step(&make_clients(4, 10.0), secs(0), None);

    let (resolve, reason) = ctl.should_resolve(&make_clients(4, 12.5), secs(3));
    assert!(resolve);
    assert_eq!(reason, ResolveReason::LoadChange);

    let (resolve, reason) = ctl.should_resolve(&make_clients(4, 11.0), secs(3));
    assert!(!resolve);
    assert_eq!(reason, ResolveReason::Cached);

    ctl.step(&make_clients(4, 12.5), secs(3), None);
    assert_eq!(solver.calls(), 2);
    assert_eq!(ctl.stats().triggered_by_load, 1);
}

#[test]
fn capacity_factor_stays_within_bounds() {
    let mut config = AdaptiveConfig::default();
    config.rolling_horizon.enabled = false;
    config.triggers.time_threshold_secs = 1.0;
    let (mut ctl, _) = controller(config);

    let demands = [10.0, 200.0, 5.0, 400.0, 1.0, 90.0, 300.0, 0.0, 50.0, 120.0];
    for (i, demand) in demands.iter().enumerate() {
        let step = ctl.step(&make_clients(2, *demand), secs(i as u64 * 2), None);
        assert!(
            (0.70..=1.0).contains(&step.capacity_factor),
            "factor {} out of range at step {i}",
            step.capacity_factor
        );
    }
    // Wild swings hit the 25% cap.
    assert_near(ctl.capacity_factor(), 0.75, 1e-12);
}

#[test]
fn steady_demand_holds_back_the_minimum_buffer() {
    let mut config = AdaptiveConfig::default();
    config.rolling_horizon.enabled = false;
    let (mut ctl, _) = controller(config);

    for i in 0..5 {
        ctl.step(&make_clients(2, 40.0), secs(i), None);
    }
    assert_near(ctl.capacity_factor(), 0.95, 1e-12);
    assert_near(ctl.effective_capacity(100.0), 95.0, 1e-9);
}

#[test]
fn smoothed_prices_blend_toward_new_duals() {
    let (mut ctl, _) = controller(plain_adaptive());

    // Uncongested: dual 0.
    let first = ctl.step(&make_clients(2, 20.0), secs(0), None);
    assert_near(first.solution.dual_price(Resource::Capacity), 0.0, 1e-9);

    // Congested: raw dual 1, smoothed 0.3 * 1 + 0.7 * 0.
    let second = ctl.step(&make_clients(2, 80.0), secs(10), None);
    assert_near(second.solution.dual_price(Resource::Capacity), 0.3, 1e-6);
    assert_near(ctl.state().last_dual_prices().get(Resource::Capacity), 1.0, 1e-6);
}

#[test]
fn forecast_pressure_averages_the_look_ahead() {
    let mut config = plain_adaptive();
    config.rolling_horizon.enabled = true;
    config.rolling_horizon.num_periods = 2;
    let (ctl, _) = controller(config);

    let light = make_clients(2, 20.0);
    let heavy = make_clients(2, 100.0);
    let forecast = vec![heavy.clone(), heavy, light];

    // Only the first two forecasts count: pressure 2.0.
    let pressure = ctl.forecast_pressure(Some(forecast.as_slice()));
    assert_near(pressure.unwrap_or_default(), 2.0, 1e-12);
    assert!(ctl.forecast_pressure(None).is_none());
    let empty: Vec<Vec<Client>> = Vec::new();
    assert!(ctl.forecast_pressure(Some(empty.as_slice())).is_none());
}

#[test]
fn reset_forgets_history_and_cache() {
    let (mut ctl, _) = controller(plain_adaptive());
    ctl.step(&scenario_b(), secs(0), None);
    ctl.reset();

    assert!(ctl.state().cached().is_none());
    assert_eq!(ctl.state().demand_history().count(), 0);
    assert_eq!(ctl.stats().total_decisions, 0);
    let (_, reason) = ctl.should_resolve(&scenario_b(), secs(1));
    assert_eq!(reason, ResolveReason::Initial);
    assert_eq!(ctl.allocator().name(), "single_resource");
}
