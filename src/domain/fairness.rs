//! Distributional fairness of an allocation.
//!
//! All functions are pure and total: degenerate inputs (empty or all-zero
//! vectors, zero demand) have defined results instead of dividing by zero.

use std::collections::BTreeMap;

use serde::Serialize;

use super::client::Client;
use super::ids::ClientId;
use super::solution::Solution;

/// Fairness measurements for one solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairnessMetrics {
    /// Jain's index in `[1/n, 1]`; 1 is perfectly equal.
    pub jains_index: f64,
    /// Gini coefficient in `[0, 1)`; 0 is perfectly equal.
    pub gini_coefficient: f64,
    /// Smallest `allocated / demand` across clients.
    pub min_allocation_ratio: f64,
    /// Largest `allocated / demand` across clients.
    pub max_allocation_ratio: f64,
    /// Population standard deviation over mean of the allocations.
    pub coefficient_of_variation: f64,
}

/// Jain's fairness index `(Σx)² / (n·Σx²)`.
///
/// Equal vectors, including all-zero, score exactly 1.0; otherwise the result
/// is clamped to `[1/n, 1]`. An empty vector scores 0.0.
pub fn jains_index(allocations: &[f64]) -> f64 {
    if allocations.is_empty() {
        return 0.0;
    }
    if all_equal(allocations) {
        return 1.0;
    }

    let n = allocations.len() as f64;
    let sum: f64 = allocations.iter().sum();
    let sum_sq: f64 = allocations.iter().map(|x| x * x).sum();

    if sum_sq == 0.0 {
        return 1.0;
    }

    ((sum * sum) / (n * sum_sq)).clamp(1.0 / n, 1.0)
}

/// Gini coefficient over the sorted allocations,
/// `2·Σ(rank·x) / (n·Σx) − (n+1)/n`, clamped to be non-negative.
///
/// Empty, all-zero and equal vectors have no inequality and score 0.0.
pub fn gini_coefficient(allocations: &[f64]) -> f64 {
    let total: f64 = allocations.iter().sum();
    if allocations.is_empty() || total == 0.0 || all_equal(allocations) {
        return 0.0;
    }

    let mut sorted = allocations.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let ranked: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i as f64 + 1.0) * x)
        .sum();

    let gini = (2.0 * ranked) / (n * total) - (n + 1.0) / n;
    gini.max(0.0)
}

/// Population standard deviation divided by the mean; 0.0 when the mean is
/// not positive.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    if m <= 0.0 {
        return 0.0;
    }
    std_dev(values) / m
}

/// `allocated / demand` per client.
///
/// A client with zero demand scores 1.0 when it received nothing and
/// `+∞` when it received something anyway.
pub fn allocation_ratios(clients: &[Client], solution: &Solution) -> BTreeMap<ClientId, f64> {
    clients
        .iter()
        .map(|client| {
            let allocated = solution.rate(client.id());
            let ratio = if client.demand() > 0.0 {
                allocated / client.demand()
            } else if allocated == 0.0 {
                1.0
            } else {
                f64::INFINITY
            };
            (client.id().clone(), ratio)
        })
        .collect()
}

/// Compute every fairness metric for `solution` over `clients`.
pub fn evaluate(clients: &[Client], solution: &Solution) -> FairnessMetrics {
    let allocations: Vec<f64> = clients.iter().map(|c| solution.rate(c.id())).collect();
    let ratios = allocation_ratios(clients, solution);

    let (min_ratio, max_ratio) = if ratios.is_empty() {
        (0.0, 0.0)
    } else {
        ratios.values().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(*r), hi.max(*r))
        })
    };

    FairnessMetrics {
        jains_index: jains_index(&allocations),
        gini_coefficient: gini_coefficient(&allocations),
        min_allocation_ratio: min_ratio,
        max_allocation_ratio: max_ratio,
        coefficient_of_variation: coefficient_of_variation(&allocations),
    }
}

fn all_equal(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jains_index_equal_allocations_is_one() {
        assert_eq!(jains_index(&[5.0, 5.0, 5.0, 5.0]), 1.0);
    }

    #[test]
    fn jains_index_fractional_equal_allocations_is_exactly_one() {
        assert_eq!(jains_index(&[0.7; 7]), 1.0);
        assert_eq!(jains_index(&[1.0 / 3.0; 5]), 1.0);
        assert_eq!(jains_index(&[0.1; 10]), 1.0);
    }

    #[test]
    fn jains_index_stays_within_bounds() {
        for v in [vec![0.7, 0.7, 0.7, 0.7000001], vec![1e-3, 1e3], vec![0.1, 0.2, 0.3]] {
            let j = jains_index(&v);
            let n = v.len() as f64;
            assert!(j >= 1.0 / n && j <= 1.0, "{v:?} -> {j}");
        }
    }

    #[test]
    fn jains_index_single_winner_is_one_over_n() {
        let j = jains_index(&[10.0, 0.0, 0.0, 0.0]);
        assert!((j - 0.25).abs() < 1e-12);
    }

    #[test]
    fn jains_index_all_zero_is_maximally_fair() {
        assert_eq!(jains_index(&[0.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn jains_index_empty_is_zero() {
        assert_eq!(jains_index(&[]), 0.0);
    }

    #[test]
    fn gini_equal_allocations_is_zero() {
        assert_eq!(gini_coefficient(&[3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn gini_fractional_equal_allocations_is_exactly_zero() {
        assert_eq!(gini_coefficient(&[1.0 / 3.0; 5]), 0.0);
        assert_eq!(gini_coefficient(&[0.1; 10]), 0.0);
        assert_eq!(gini_coefficient(&[0.7; 7]), 0.0);
    }

    #[test]
    fn gini_single_winner() {
        // n = 4, one holder: 2*4*x/(4*x) - 5/4 = 0.75
        let g = gini_coefficient(&[0.0, 0.0, 8.0, 0.0]);
        assert!((g - 0.75).abs() < 1e-12);
    }

    #[test]
    fn gini_all_zero_is_zero() {
        assert_eq!(gini_coefficient(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn gini_ignores_input_order() {
        let a = gini_coefficient(&[1.0, 2.0, 7.0]);
        let b = gini_coefficient(&[7.0, 1.0, 2.0]);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn cv_of_equal_values_is_zero() {
        assert_eq!(coefficient_of_variation(&[4.0, 4.0]), 0.0);
    }

    #[test]
    fn cv_uses_population_std() {
        // mean 2, population std 1
        let cv = coefficient_of_variation(&[1.0, 3.0]);
        assert!((cv - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cv_of_zero_mean_is_zero() {
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), 0.0);
    }
}
