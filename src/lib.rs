//! # Sales Analytics
//!
//! A library for turning a flat list of sales records into the aggregates a
//! sales dashboard displays: monthly revenue maps, product/agent/region
//! leaderboards, seasonal buckets, moving-average time series, and
//! period-over-period comparisons, all gated by role-based visibility.
//!
//! ## Core Concepts
//!
//! - **Normalization**: raw spreadsheet rows (untyped JSON) become canonical
//!   [`SalesRecord`]s with real dates and coerced numerics
//! - **Role scope**: agents see their own records, brokers their book,
//!   supervisors everything; user filters can only narrow that scope
//! - **Aggregation**: pure reductions keyed by "YYYY-MM" month keys,
//!   product/agent/region, or calendar month-of-year
//! - **Period comparison**: current vs. previous calendar window (the
//!   canonical routine) or the filtered span shifted back one period
//!
//! Every function is a pure transformation over its inputs; recompute the
//! snapshot whenever records, identity, or criteria change.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_analytics::*;
//!
//! let rows = load_rows_from_json("data.json")?;
//! let records = normalize_rows(&rows);
//!
//! let identity = UserIdentity::new(Role::Broker, "BRK001");
//! let criteria = FilterCriteria {
//!     region: Some("North".to_string()),
//!     ..Default::default()
//! };
//!
//! let snapshot = compute_snapshot(&records, &identity, &criteria)?;
//! if let Some(metrics) = &snapshot.metrics {
//!     println!("total revenue: {}", metrics.total_revenue);
//! }
//! ```

pub mod aggregate;
pub mod compare;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod normalize;
pub mod record;
pub mod utils;

pub use aggregate::{
    aggregate_by_agent, aggregate_by_month, aggregate_by_product, aggregate_by_region,
    revenue_distribution, seasonal_breakdown, time_series_with_ma, AgentPerformance,
    ProductRevenue, SeasonalBreakdown, TimeSeries, MONTH_NAMES,
};
pub use compare::{
    compare_calendar_period, compare_filtered_span, GrowthRates, PeriodComparison, PeriodTotals,
    SpanComparison,
};
pub use error::{Result, SalesAnalyticsError};
pub use filter::{apply_filters, filter_options, FilterOptions};
pub use metrics::{summarize, Metrics};
pub use normalize::{load_rows_from_json, normalize_rows};
pub use record::{
    ComparisonMode, FilterCriteria, Metric, Role, SalesRecord, TimeFrame, UserIdentity,
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many leaderboard rows a snapshot carries.
const DEFAULT_TOP_N: usize = 10;

/// Everything the presentation layer needs for one render pass, computed
/// from scratch on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub record_count: usize,
    pub metrics: Option<Metrics>,
    pub monthly_revenue: BTreeMap<String, f64>,
    pub top_products: Vec<ProductRevenue>,
    pub top_agents: Vec<AgentPerformance>,
    pub regional_revenue: BTreeMap<String, f64>,
    pub seasonal: SeasonalBreakdown,
    pub revenue_series: TimeSeries,
    pub volume_series: TimeSeries,
    /// Calendar-window comparison anchored to the latest visible record.
    pub period_comparison: Option<PeriodComparison>,
    /// Span-window comparison over the filtered subset.
    pub span_comparison: Option<SpanComparison>,
}

pub struct DashboardProcessor;

impl DashboardProcessor {
    /// Filters `records` for `identity`/`criteria` and computes the full set
    /// of dashboard aggregates over the visible subset.
    pub fn snapshot(
        records: &[SalesRecord],
        identity: &UserIdentity,
        criteria: &FilterCriteria,
    ) -> Result<DashboardSnapshot> {
        info!(
            "Computing dashboard snapshot for {:?} over {} records",
            identity.role,
            records.len()
        );

        let subset = apply_filters(records, identity, criteria);
        debug!("{} records visible after filtering", subset.len());

        let span_comparison = compare_filtered_span(&subset, records, identity, criteria);

        let period_comparison = match subset.iter().map(|r| r.date).max() {
            Some(latest) => Some(compare_calendar_period(
                &subset,
                latest,
                criteria.comparison_type,
            )?),
            None => None,
        };

        let metrics = summarize(&subset, span_comparison.as_ref());

        Ok(DashboardSnapshot {
            record_count: subset.len(),
            metrics,
            monthly_revenue: aggregate_by_month(&subset),
            top_products: aggregate_by_product(&subset, Some(DEFAULT_TOP_N)),
            top_agents: aggregate_by_agent(&subset, Some(DEFAULT_TOP_N)),
            regional_revenue: aggregate_by_region(&subset),
            seasonal: seasonal_breakdown(&subset),
            revenue_series: time_series_with_ma(&subset, Metric::Revenue),
            volume_series: time_series_with_ma(&subset, Metric::Volume),
            period_comparison,
            span_comparison,
        })
    }
}

pub fn compute_snapshot(
    records: &[SalesRecord],
    identity: &UserIdentity,
    criteria: &FilterCriteria,
) -> Result<DashboardSnapshot> {
    DashboardProcessor::snapshot(records, identity, criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(
        year: i32,
        month: u32,
        revenue: f64,
        agent: &str,
        broker: &str,
        region: &str,
    ) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
            total_revenue: revenue,
            sales_volume: revenue / 50.0,
            agent_code: agent.to_string(),
            broker_code: broker.to_string(),
            product_name: "Term Life".to_string(),
            customer_region: region.to_string(),
        }
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            record(2024, 1, 100.0, "AGT001", "BRK001", "North"),
            record(2024, 2, 150.0, "AGT002", "BRK001", "South"),
            record(2024, 3, 200.0, "AGT003", "BRK002", "North"),
        ]
    }

    #[test]
    fn test_snapshot_end_to_end() {
        let records = sample();
        let identity = UserIdentity::new(Role::Supervisor, "SUP001");
        let snapshot =
            compute_snapshot(&records, &identity, &FilterCriteria::default()).unwrap();

        assert_eq!(snapshot.record_count, 3);
        let metrics = snapshot.metrics.unwrap();
        assert_eq!(metrics.total_revenue, 450.0);
        assert_eq!(snapshot.monthly_revenue.len(), 3);
        assert_eq!(snapshot.top_agents.len(), 3);
        assert!(snapshot.period_comparison.is_some());
        assert!(snapshot.span_comparison.is_some());
    }

    #[test]
    fn test_snapshot_respects_role_scope() {
        let records = sample();
        let identity = UserIdentity::new(Role::Broker, "BRK002");
        let snapshot =
            compute_snapshot(&records, &identity, &FilterCriteria::default()).unwrap();

        assert_eq!(snapshot.record_count, 1);
        assert_eq!(snapshot.metrics.unwrap().total_revenue, 200.0);
    }

    #[test]
    fn test_snapshot_over_empty_subset() {
        let records = sample();
        let identity = UserIdentity::new(Role::Agent, "AGT999");
        let snapshot =
            compute_snapshot(&records, &identity, &FilterCriteria::default()).unwrap();

        assert_eq!(snapshot.record_count, 0);
        assert!(snapshot.metrics.is_none());
        assert!(snapshot.monthly_revenue.is_empty());
        assert!(snapshot.period_comparison.is_none());
        assert!(snapshot.span_comparison.is_none());
    }

    #[test]
    fn test_snapshot_totals_match_subset() {
        let records = sample();
        let identity = UserIdentity::new(Role::Supervisor, "SUP001");
        let snapshot =
            compute_snapshot(&records, &identity, &FilterCriteria::default()).unwrap();

        let monthly_total: f64 = snapshot.monthly_revenue.values().sum();
        let metrics_total = snapshot.metrics.unwrap().total_revenue;
        assert!((monthly_total - metrics_total).abs() < 1e-9);
    }
}
