//! Pure reductions over a record subset: monthly grouping, leaderboards,
//! seasonal buckets, and moving-average time series.

use crate::record::{Metric, SalesRecord};
use crate::utils::month_key;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Revenue summed per "YYYY-MM" key. BTreeMap keeps keys in chronological
/// order since the key format sorts lexicographically.
pub fn aggregate_by_month(records: &[SalesRecord]) -> BTreeMap<String, f64> {
    let mut monthly = BTreeMap::new();
    for record in records {
        *monthly.entry(month_key(record.date)).or_insert(0.0) += record.total_revenue;
    }
    monthly
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub product: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPerformance {
    pub agent: String,
    pub revenue: f64,
    pub volume: f64,
}

/// Products by summed revenue, descending. The sort is stable, so revenue
/// ties keep first-encountered order. `top_n` truncates when given.
pub fn aggregate_by_product(
    records: &[SalesRecord],
    top_n: Option<usize>,
) -> Vec<ProductRevenue> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<ProductRevenue> = Vec::new();

    for record in records {
        match index.get(&record.product_name) {
            Some(&i) => totals[i].revenue += record.total_revenue,
            None => {
                index.insert(record.product_name.clone(), totals.len());
                totals.push(ProductRevenue {
                    product: record.product_name.clone(),
                    revenue: record.total_revenue,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    if let Some(n) = top_n {
        totals.truncate(n);
    }
    totals
}

/// Agents by summed revenue (descending, stable ties) with summed volume
/// carried alongside.
pub fn aggregate_by_agent(
    records: &[SalesRecord],
    top_n: Option<usize>,
) -> Vec<AgentPerformance> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<AgentPerformance> = Vec::new();

    for record in records {
        match index.get(&record.agent_code) {
            Some(&i) => {
                totals[i].revenue += record.total_revenue;
                totals[i].volume += record.sales_volume;
            }
            None => {
                index.insert(record.agent_code.clone(), totals.len());
                totals.push(AgentPerformance {
                    agent: record.agent_code.clone(),
                    revenue: record.total_revenue,
                    volume: record.sales_volume,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    if let Some(n) = top_n {
        totals.truncate(n);
    }
    totals
}

pub fn aggregate_by_region(records: &[SalesRecord]) -> BTreeMap<String, f64> {
    let mut regional = BTreeMap::new();
    for record in records {
        *regional.entry(record.customer_region.clone()).or_insert(0.0) += record.total_revenue;
    }
    regional
}

/// Calendar month-of-year buckets collapsed across all years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalBreakdown {
    pub months: Vec<String>,
    pub revenue: Vec<f64>,
    pub transactions: Vec<u64>,
}

pub fn seasonal_breakdown(records: &[SalesRecord]) -> SeasonalBreakdown {
    let mut revenue = vec![0.0; 12];
    let mut transactions = vec![0u64; 12];

    for record in records {
        let idx = record.date.month0() as usize;
        revenue[idx] += record.total_revenue;
        transactions[idx] += 1;
    }

    SeasonalBreakdown {
        months: MONTH_NAMES.iter().map(|m| (*m).to_string()).collect(),
        revenue,
        transactions,
    }
}

/// Monthly series with trailing 6- and 12-month simple moving averages.
///
/// `ma6[i]` averages the 6 values ending at `values[ma6_start + i]`; the
/// vector is empty (and the start index equals the series length) when fewer
/// than 6 months of data exist. Same rule for `ma12` at 12.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub ma6: Vec<f64>,
    pub ma12: Vec<f64>,
    pub ma6_start: usize,
    pub ma12_start: usize,
}

pub fn time_series_with_ma(records: &[SalesRecord], metric: Metric) -> TimeSeries {
    let mut monthly: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        let value = match metric {
            Metric::Revenue => record.total_revenue,
            Metric::Volume => record.sales_volume,
        };
        *monthly.entry(month_key(record.date)).or_insert(0.0) += value;
    }

    let labels: Vec<String> = monthly.keys().cloned().collect();
    let values: Vec<f64> = monthly.values().copied().collect();

    let ma6 = trailing_mean(&values, 6);
    let ma12 = trailing_mean(&values, 12);

    let ma6_start = if values.len() >= 6 { 5 } else { values.len() };
    let ma12_start = if values.len() >= 12 { 11 } else { values.len() };

    TimeSeries {
        labels,
        values,
        ma6,
        ma12,
        ma6_start,
        ma12_start,
    }
}

fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    if values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Monthly revenue values in month order, for histogram-style consumers.
pub fn revenue_distribution(records: &[SalesRecord]) -> Vec<f64> {
    aggregate_by_month(records).into_values().collect()
}
