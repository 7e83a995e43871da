use chrono::{Datelike, NaiveDate};

/// Grouping key for monthly aggregation, e.g. "2024-03".
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

pub fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
}

/// `None` only when the year-month itself is outside the representable
/// date range, so December of the last representable year still resolves.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    (28..=31)
        .rev()
        .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
}

/// First day of the calendar quarter containing `date` (Jan/Apr/Jul/Oct 1).
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let quarter_month = ((date.month() - 1) / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), quarter_month, 1).unwrap()
}

/// Shifts a date by whole months, clamping the day to the end of the
/// target month (Mar 31 - 1 month = Feb 28/29).
pub fn shift_months(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let months = date.year() * 12 + date.month() as i32 - 1 + delta;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;

    let day = date.day().min(last_day_of_month(year, month)?.day());
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn shift_years(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    shift_months(date, delta * 12)
}

/// Percentage growth from `previous` to `current`. Division by zero never
/// occurs: a zero baseline maps to 100% when any value appeared, 0% otherwise.
pub fn growth_pct(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}
