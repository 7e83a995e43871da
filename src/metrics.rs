//! Headline metrics consumed by the dashboard's summary cards.

use crate::aggregate::{aggregate_by_agent, aggregate_by_month, aggregate_by_product};
use crate::compare::SpanComparison;
use crate::record::SalesRecord;
use crate::utils::growth_pct;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_revenue: f64,
    pub total_volume: f64,
    pub avg_revenue_per_unit: f64,
    /// Month-over-month change between the last two months present.
    pub growth: f64,
    pub top_product: String,
    pub top_product_revenue: f64,
    pub top_agent: String,
    pub top_agent_revenue: f64,
    pub top_agent_volume: f64,
    pub unique_agents: usize,
    pub unique_regions: usize,
    /// Taken from the supplied period comparison when present, otherwise the
    /// same last-two-months figure as `growth`.
    pub revenue_growth: f64,
}

/// Change between the last two monthly revenue sums, 0 with fewer than two
/// months of data.
fn last_two_months_growth(records: &[SalesRecord]) -> f64 {
    let monthly = aggregate_by_month(records);
    let values: Vec<f64> = monthly.into_values().collect();
    if values.len() < 2 {
        return 0.0;
    }
    growth_pct(values[values.len() - 1], values[values.len() - 2])
}

/// Composes the aggregate heads into a flat metrics block. Returns `None`
/// for an empty subset.
pub fn summarize(subset: &[SalesRecord], comparison: Option<&SpanComparison>) -> Option<Metrics> {
    if subset.is_empty() {
        return None;
    }

    let total_revenue: f64 = subset.iter().map(|r| r.total_revenue).sum();
    let total_volume: f64 = subset.iter().map(|r| r.sales_volume).sum();

    let avg_revenue_per_unit = if total_volume > 0.0 {
        total_revenue / total_volume
    } else {
        total_revenue / subset.len() as f64
    };

    let (top_product, top_product_revenue) = aggregate_by_product(subset, Some(1))
        .into_iter()
        .next()
        .map(|p| (p.product, p.revenue))
        .unwrap_or_else(|| ("-".to_string(), 0.0));

    let (top_agent, top_agent_revenue, top_agent_volume) = aggregate_by_agent(subset, Some(1))
        .into_iter()
        .next()
        .map(|a| (a.agent, a.revenue, a.volume))
        .unwrap_or_else(|| ("-".to_string(), 0.0, 0.0));

    let unique_agents = subset
        .iter()
        .map(|r| r.agent_code.as_str())
        .collect::<HashSet<_>>()
        .len();
    let unique_regions = subset
        .iter()
        .map(|r| r.customer_region.as_str())
        .collect::<HashSet<_>>()
        .len();

    let growth = last_two_months_growth(subset);
    let revenue_growth = comparison.map_or(growth, |c| c.revenue_growth);

    Some(Metrics {
        total_revenue,
        total_volume,
        avg_revenue_per_unit,
        growth,
        top_product,
        top_product_revenue,
        top_agent,
        top_agent_revenue,
        top_agent_volume,
        unique_agents,
        unique_regions,
        revenue_growth,
    })
}
