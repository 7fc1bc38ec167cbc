//! Allocator integration tests against the HiGHS backend.

mod support;

use std::sync::Arc;

use ratewise::application::{MultiResourceAllocator, ResourceAllocator};
use ratewise::domain::{Resource, ResourceProfile, SolveStatus, SystemResources, Tier};
use ratewise::port::Allocator;
use ratewise::testkit::config::allocator;
use ratewise::testkit::domain::{client, make_clients, profiled, scenario_a, scenario_b, scenario_c};
use ratewise::testkit::solver::{FailingSolver, RecordingSolver};

use support::assert_near;

fn highs_allocator(capacity: f64) -> (ResourceAllocator, RecordingSolver) {
    let solver = RecordingSolver::new();
    let alloc = ResourceAllocator::new(&allocator(capacity), Arc::new(solver.clone()))
        .expect("valid allocator config");
    (alloc, solver)
}

#[test]
fn under_capacity_every_client_gets_full_demand() {
    let (mut alloc, _) = highs_allocator(100.0);
    let clients = scenario_a();
    let solution = alloc.solve(&clients, 100.0);

    assert_eq!(solution.status(), SolveStatus::Optimal);
    assert_near(solution.rate(&"premium".into()), 50.0, 1e-6);
    assert_near(solution.rate(&"standard".into()), 40.0, 1e-6);
    assert_near(solution.dual_price(Resource::Capacity), 0.0, 1e-6);
    assert_near(solution.objective(), 700.0, 1e-6);
}

#[test]
fn over_capacity_prices_the_marginal_client() {
    let (mut alloc, _) = highs_allocator(100.0);
    let solution = alloc.solve(&scenario_b(), 100.0);

    assert!(solution.is_feasible());
    assert_near(solution.rate(&"premium".into()), 50.0, 1e-6);
    assert_near(solution.rate(&"standard".into()), 50.0, 1e-6);
    assert_near(solution.total_rate(), 100.0, 1e-6);
    assert_near(solution.dual_price(Resource::Capacity), 5.0, 1e-6);
    assert_near(solution.objective(), 750.0, 1e-6);
}

#[test]
fn sla_floors_above_capacity_never_reach_the_backend() {
    let (mut alloc, solver) = highs_allocator(100.0);
    let solution = alloc.solve(&scenario_c(), 100.0);

    assert_eq!(solution.status(), SolveStatus::Infeasible);
    assert!(solution.rates().iter().all(|r| *r == 0.0));
    assert!(solution.reason().unwrap_or_default().contains("120"));
    assert_eq!(solver.calls(), 0);
    assert_eq!(alloc.solve_count(), 0);
    assert!(alloc.previous().is_none());
}

#[test]
fn floor_above_demand_is_infeasible() {
    let (mut alloc, solver) = highs_allocator(100.0);
    let clients = vec![client("greedy", Tier::Premium, 1.0, 30.0, 10.0)];

    assert!(alloc.check_feasibility(&clients, 100.0).is_err());
    let solution = alloc.solve(&clients, 100.0);
    assert_eq!(solution.status(), SolveStatus::Infeasible);
    assert_eq!(solver.calls(), 0);
}

#[test]
fn backend_failure_is_a_zero_allocation() {
    let mut alloc =
        ResourceAllocator::new(&allocator(100.0), Arc::new(FailingSolver)).expect("valid config");
    let solution = alloc.solve(&scenario_a(), 100.0);

    assert_eq!(solution.status(), SolveStatus::Error);
    assert!(solution.rates().iter().all(|r| *r == 0.0));
    assert_eq!(solution.dual_price(Resource::Capacity), 0.0);
    assert_eq!(alloc.solve_count(), 1);
}

#[test]
fn feasible_solutions_respect_floors_demand_and_capacity() {
    let (mut alloc, _) = highs_allocator(120.0);
    for n in [1_usize, 3, 7, 15] {
        let mut clients = make_clients(n, 25.0);
        clients.push(client("vip", Tier::Premium, 2.0, 10.0, 40.0));
        let solution = alloc.solve(&clients, 120.0);
        assert!(solution.is_feasible(), "n = {n}");

        for c in &clients {
            let rate = solution.rate(c.id());
            assert!(rate >= c.min_rate() - 1e-6, "{} below floor", c.id());
            assert!(rate <= c.demand() + 1e-6, "{} above demand", c.id());
        }
        assert!(solution.total_rate() <= 120.0 + 1e-6);
        assert!(solution.dual_price(Resource::Capacity) >= 0.0);
    }
}

#[test]
fn empty_client_list_is_trivially_optimal() {
    let (mut alloc, _) = highs_allocator(100.0);
    let solution = alloc.solve(&[], 100.0);

    assert!(solution.is_feasible());
    assert_eq!(solution.total_rate(), 0.0);
    assert_eq!(solution.objective(), 0.0);
}

#[test]
fn multi_resource_respects_every_dimension() {
    let resources = SystemResources::new(1000.0, 2048.0, 10_000.0);
    let solver = RecordingSolver::new();
    let mut alloc =
        MultiResourceAllocator::new(resources, &allocator(100.0), Arc::new(solver.clone()))
            .expect("valid resources");

    let heavy_cpu = ResourceProfile::new(50.0, 10.0, 100.0, 500.0);
    let heavy_mem = ResourceProfile::new(5.0, 200.0, 100.0, 500.0);
    let clients = vec![
        profiled("cpu", 1.0, 40.0, heavy_cpu),
        profiled("mem", 1.0, 40.0, heavy_mem),
    ];
    let solution = alloc.solve(&clients, &resources);

    assert!(solution.is_feasible());
    assert_eq!(solver.calls(), 1);
    for resource in Resource::MULTI {
        let used: f64 = clients
            .iter()
            .map(|c| solution.rate(c.id()) * c.profile().consumption(resource))
            .sum();
        assert!(
            used <= resources.capacity(resource) + 1e-6,
            "{resource} over capacity: {used}"
        );
        let util = solution.utilization()[&resource];
        assert!((0.0..=1.0 + 1e-9).contains(&util));
        assert!(solution.dual_price(resource) >= 0.0);
    }
    assert_eq!(solution.response_times_ms().len(), 2);
}

#[test]
fn multi_resource_scales_capacity_through_the_port() {
    let resources = SystemResources::new(1000.0, 2048.0, 10_000.0);
    let mut alloc = MultiResourceAllocator::new(
        resources,
        &allocator(100.0),
        Arc::new(RecordingSolver::new()),
    )
    .expect("valid resources");

    // CPU-bound: 20ms per request against 1000ms gives 50 req/s nominal.
    let cpu_bound = ResourceProfile::new(20.0, 1.0, 1.0, 200.0);
    let clients = vec![profiled("only", 1.0, 100.0, cpu_bound)];
    let full = alloc.allocate(&clients, 1.0);
    let reduced = alloc.allocate(&clients, 0.8);

    assert_near(full.total_rate(), 50.0, 1e-6);
    assert_near(reduced.total_rate(), 40.0, 1e-6);
    assert_eq!(alloc.solve_count(), 2);
    assert_near(alloc.demand_pressure(&clients), 2.0, 1e-9);
}

#[test]
fn response_time_grows_with_load() {
    let c = profiled("rt", 1.0, 10.0, ResourceProfile::default());
    let idle = MultiResourceAllocator::estimate_response_time(&c, 0.0, 1000.0);
    let busy = MultiResourceAllocator::estimate_response_time(&c, 900.0, 1000.0);
    let saturated = MultiResourceAllocator::estimate_response_time(&c, 5000.0, 1000.0);

    assert_near(idle, 20.0, 1e-9);
    assert!(busy > idle);
    // Utilization is capped at 0.95.
    assert_near(saturated, 20.0 + 20.0 * 0.95 / 0.05, 1e-6);
}
