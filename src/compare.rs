//! Period-over-period comparison.
//!
//! Two routines coexist, inherited as distinct behaviors:
//!
//! * [`compare_calendar_period`] is the canonical routine. Windows are fixed
//!   calendar periods (month, quarter, year, year-to-date) anchored to a
//!   reference date, half-open `[start, end)`, and the previous window is the
//!   same shape one unit earlier.
//! * [`compare_filtered_span`] anchors the current window to the filtered
//!   subset's own date span and shifts that exact span back, re-applying the
//!   role/filter chain (without date bounds) to the comparison pool. Revenue
//!   only; this feeds the dashboard's headline growth card.

use crate::error::{Result, SalesAnalyticsError};
use crate::filter::{criteria_allows, role_scope_allows};
use crate::record::{ComparisonMode, FilterCriteria, SalesRecord, UserIdentity};
use crate::utils::{first_of_month, first_of_next_month, growth_pct, quarter_start, shift_months, shift_years};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub revenue: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub revenue: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    pub growth: GrowthRates,
    pub label: String,
}

fn totals_in_window(records: &[SalesRecord], start: NaiveDate, end: NaiveDate) -> PeriodTotals {
    let mut totals = PeriodTotals::default();
    for record in records {
        if record.date >= start && record.date < end {
            totals.revenue += record.total_revenue;
            totals.volume += record.sales_volume;
        }
    }
    totals
}

fn date_error(what: &str, around: NaiveDate) -> SalesAnalyticsError {
    SalesAnalyticsError::DateError(format!("{} out of range near {}", what, around))
}

/// Current and previous half-open windows for `mode`, anchored to `target`.
fn calendar_windows(
    target: NaiveDate,
    mode: ComparisonMode,
) -> Result<((NaiveDate, NaiveDate), (NaiveDate, NaiveDate))> {
    match mode {
        ComparisonMode::MonthOverMonth => {
            let start = first_of_month(target);
            let end = first_of_next_month(target).ok_or_else(|| date_error("month end", target))?;
            let prev_start =
                shift_months(start, -1).ok_or_else(|| date_error("previous month", target))?;
            Ok(((start, end), (prev_start, start)))
        }
        ComparisonMode::QuarterOverQuarter => {
            let start = quarter_start(target);
            let end =
                shift_months(start, 3).ok_or_else(|| date_error("quarter end", target))?;
            let prev_start =
                shift_months(start, -3).ok_or_else(|| date_error("previous quarter", target))?;
            Ok(((start, end), (prev_start, start)))
        }
        ComparisonMode::YearOverYear => {
            let start = NaiveDate::from_ymd_opt(target.year(), 1, 1)
                .ok_or_else(|| date_error("year start", target))?;
            let end = shift_years(start, 1).ok_or_else(|| date_error("year end", target))?;
            let prev_start =
                shift_years(start, -1).ok_or_else(|| date_error("previous year", target))?;
            Ok(((start, end), (prev_start, start)))
        }
        ComparisonMode::YearToDate => {
            let start = NaiveDate::from_ymd_opt(target.year(), 1, 1)
                .ok_or_else(|| date_error("year start", target))?;
            let end = first_of_next_month(target).ok_or_else(|| date_error("month end", target))?;
            let prev_start =
                shift_years(start, -1).ok_or_else(|| date_error("previous year", target))?;
            let prev_end =
                shift_years(end, -1).ok_or_else(|| date_error("previous period end", target))?;
            Ok(((start, end), (prev_start, prev_end)))
        }
    }
}

fn calendar_label(mode: ComparisonMode) -> &'static str {
    match mode {
        ComparisonMode::MonthOverMonth => "vs. Previous Month",
        ComparisonMode::QuarterOverQuarter => "vs. Previous Quarter",
        ComparisonMode::YearOverYear => "vs. Previous Year",
        ComparisonMode::YearToDate => "vs. Prior Year-to-Date",
    }
}

/// Compares the calendar period containing `target` against the period one
/// unit earlier. Windows are half-open: a record on the first day of the next
/// period belongs to that next period.
pub fn compare_calendar_period(
    records: &[SalesRecord],
    target: NaiveDate,
    mode: ComparisonMode,
) -> Result<PeriodComparison> {
    let ((cur_start, cur_end), (prev_start, prev_end)) = calendar_windows(target, mode)?;

    let current = totals_in_window(records, cur_start, cur_end);
    let previous = totals_in_window(records, prev_start, prev_end);

    Ok(PeriodComparison {
        growth: GrowthRates {
            revenue: growth_pct(current.revenue, previous.revenue),
            volume: growth_pct(current.volume, previous.volume),
        },
        current,
        previous,
        label: calendar_label(mode).to_string(),
    })
}

/// Revenue comparison anchored to the filtered subset's own date span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanComparison {
    pub current_revenue: f64,
    pub previous_revenue: f64,
    pub revenue_growth: f64,
    pub label: String,
}

fn span_label(mode: ComparisonMode) -> &'static str {
    match mode {
        ComparisonMode::MonthOverMonth => "vs last month",
        ComparisonMode::QuarterOverQuarter => "vs last quarter",
        ComparisonMode::YearOverYear => "vs last year",
        ComparisonMode::YearToDate => "vs prior year",
    }
}

/// Previous window (inclusive bounds) for the span routine.
fn span_previous_window(
    span_start: NaiveDate,
    span_end: NaiveDate,
    mode: ComparisonMode,
) -> Option<(NaiveDate, NaiveDate)> {
    match mode {
        ComparisonMode::MonthOverMonth => {
            Some((shift_months(span_start, -1)?, shift_months(span_end, -1)?))
        }
        ComparisonMode::YearOverYear => {
            Some((shift_years(span_start, -1)?, shift_years(span_end, -1)?))
        }
        ComparisonMode::QuarterOverQuarter => {
            // Quarter preceding the one containing the span's latest date,
            // first day through last day.
            let current_quarter = quarter_start(span_end);
            let prev_start = shift_months(current_quarter, -3)?;
            let prev_end = current_quarter.checked_sub_days(Days::new(1))?;
            Some((prev_start, prev_end))
        }
        ComparisonMode::YearToDate => {
            let prev_year = span_end.year() - 1;
            Some((
                NaiveDate::from_ymd_opt(prev_year, 1, 1)?,
                NaiveDate::from_ymd_opt(prev_year, 12, 31)?,
            ))
        }
    }
}

/// Compares the already-filtered subset's revenue against the same span one
/// period earlier, drawn from `all` with the role/filter chain re-applied
/// (date bounds excluded so the shifted window can reach outside them).
///
/// Returns `None` when the filtered subset is empty.
pub fn compare_filtered_span(
    filtered: &[SalesRecord],
    all: &[SalesRecord],
    identity: &UserIdentity,
    criteria: &FilterCriteria,
) -> Option<SpanComparison> {
    if filtered.is_empty() {
        return None;
    }

    let current_revenue: f64 = filtered.iter().map(|r| r.total_revenue).sum();
    let span_start = filtered.iter().map(|r| r.date).min()?;
    let span_end = filtered.iter().map(|r| r.date).max()?;

    let mode = criteria.comparison_type;
    let (prev_start, prev_end) = span_previous_window(span_start, span_end, mode)?;

    let previous_revenue: f64 = all
        .iter()
        .filter(|r| role_scope_allows(r, identity))
        .filter(|r| criteria_allows(r, identity, criteria))
        .filter(|r| r.date >= prev_start && r.date <= prev_end)
        .map(|r| r.total_revenue)
        .sum();

    Some(SpanComparison {
        current_revenue,
        previous_revenue,
        revenue_growth: growth_pct(current_revenue, previous_revenue),
        label: span_label(mode).to_string(),
    })
}
