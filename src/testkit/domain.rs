//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`Client`] and [`Request`] and the
//! three reference scenarios, so tests focus on assertions rather than
//! construction boilerplate.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::{Client, ClientId, Request, ResourceProfile, Tier};

/// Create a client with willingness to pay of 1.00.
pub fn client(id: &str, tier: Tier, weight: f64, min_rate: f64, demand: f64) -> Client {
    Client::builder(id, tier)
        .weight(weight)
        .min_rate(min_rate)
        .demand(demand)
        .willingness_to_pay(Decimal::ONE)
        .build()
        .expect("test client should be valid")
}

/// Create a client with an explicit resource profile.
pub fn profiled(id: &str, weight: f64, demand: f64, profile: ResourceProfile) -> Client {
    Client::builder(id, Tier::Standard)
        .weight(weight)
        .demand(demand)
        .willingness_to_pay(Decimal::ONE)
        .profile(profile)
        .build()
        .expect("test client should be valid")
}

/// Create `n` standard clients named `c0`, `c1`, ... with equal demand.
pub fn make_clients(n: usize, demand: f64) -> Vec<Client> {
    (0..n)
        .map(|i| client(&format!("c{i}"), Tier::Standard, 1.0, 0.0, demand))
        .collect()
}

/// Create a request for `client_id` at time zero.
pub fn request(client_id: &str, tier: Tier, max_price: Decimal) -> Request {
    Request {
        client_id: ClientId::new(client_id),
        timestamp: Duration::ZERO,
        tier,
        max_price,
    }
}

/// Premium (floor 30, weight 10, demand 50) and standard (weight 5,
/// demand 40): total demand 90 under capacity 100.
pub fn scenario_a() -> Vec<Client> {
    vec![
        client("premium", Tier::Premium, 10.0, 30.0, 50.0),
        client("standard", Tier::Standard, 5.0, 0.0, 40.0),
    ]
}

/// Scenario A with standard demand raised to 80: total demand 130.
pub fn scenario_b() -> Vec<Client> {
    vec![
        client("premium", Tier::Premium, 10.0, 30.0, 50.0),
        client("standard", Tier::Standard, 5.0, 0.0, 80.0),
    ]
}

/// Hard-SLA floors summing to 120 against capacity 100.
pub fn scenario_c() -> Vec<Client> {
    vec![
        client("p1", Tier::Premium, 10.0, 40.0, 60.0),
        client("p2", Tier::Premium, 10.0, 40.0, 60.0),
        client("p3", Tier::Premium, 10.0, 40.0, 60.0),
    ]
}
