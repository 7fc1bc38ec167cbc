//! Tabular run summaries.

use tabled::{Table, Tabled};

use crate::domain::RunSummary;

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct TierRow {
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Requests")]
    requests: u64,
    #[tabled(rename = "Accepted")]
    accepted: u64,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Avg Price")]
    avg_price: String,
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Headline metrics of a run.
#[must_use]
pub fn metrics_table(summary: &RunSummary) -> String {
    let adaptive = &summary.adaptive;
    let pricing = &summary.pricing;
    let rows = vec![
        MetricRow {
            metric: "Periods",
            value: summary.periods.to_string(),
        },
        MetricRow {
            metric: "Infeasible periods",
            value: summary.infeasible_periods.to_string(),
        },
        MetricRow {
            metric: "Solves",
            value: adaptive.total_solves.to_string(),
        },
        MetricRow {
            metric: "Skip rate",
            value: percent(adaptive.skip_rate),
        },
        MetricRow {
            metric: "Mean Jain's index",
            value: format!("{:.4}", summary.mean_jains_index),
        },
        MetricRow {
            metric: "Requests",
            value: pricing.total_requests.to_string(),
        },
        MetricRow {
            metric: "Acceptance rate",
            value: percent(pricing.acceptance_rate),
        },
        MetricRow {
            metric: "Revenue",
            value: format!("${}", pricing.total_revenue),
        },
    ];
    Table::new(rows).to_string()
}

/// Per-tier admission breakdown.
#[must_use]
pub fn tier_table(summary: &RunSummary) -> String {
    let rows: Vec<TierRow> = summary
        .pricing
        .tiers
        .iter()
        .rev()
        .map(|(tier, stats)| TierRow {
            tier: tier.to_string(),
            requests: stats.total_requests,
            accepted: stats.accepted,
            rate: percent(stats.acceptance_rate),
            revenue: format!("${}", stats.revenue),
            avg_price: format!("${}", stats.avg_price_paid),
        })
        .collect();
    Table::new(rows).to_string()
}
