//! Turns raw spreadsheet rows into canonical [`SalesRecord`]s.
//!
//! Upstream loaders hand over untyped JSON objects keyed by the sheet headers
//! (`Date`, `Total Revenue`, ...). Field values arrive as strings, numbers, or
//! spreadsheet date serials depending on how the sheet was exported, so every
//! field is coerced individually. Rows whose date cannot be recovered are
//! dropped rather than stamped with the current date, which would corrupt
//! monthly aggregation.

use crate::error::Result;
use crate::record::SalesRecord;
use chrono::{DateTime, Datelike, Duration, NaiveDate};
use log::{debug, warn};
use serde_json::Value;
use std::path::Path;

pub const COL_DATE: &str = "Date";
pub const COL_REVENUE: &str = "Total Revenue";
pub const COL_VOLUME: &str = "Sales Volume";
pub const COL_AGENT: &str = "Agent Code";
pub const COL_BROKER: &str = "Broker Code";
pub const COL_PRODUCT: &str = "Product Name";
pub const COL_REGION: &str = "Customer Region";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Spreadsheet date-serial origin: day 0 is 1899-12-30.
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
}

fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let seconds = (serial * SECONDS_PER_DAY) as i64;
    serial_epoch()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .checked_add_signed(Duration::seconds(seconds))
        .map(|dt| dt.date())
}

fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    let date = match value? {
        Value::Number(n) => date_from_serial(n.as_f64()?),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Some(date)
            } else if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                Some(dt.date_naive())
            } else {
                // Exports sometimes render the serial itself as text.
                s.parse::<f64>().ok().and_then(date_from_serial)
            }
        }
        _ => None,
    };

    // BCE years would break the "YYYY-MM sorts chronologically" month-key
    // invariant; a sales sheet producing one is junk input.
    date.filter(|d| d.year() >= 0)
}

fn parse_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn parse_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Normalizes raw rows into [`SalesRecord`]s sorted ascending by date.
///
/// Rows that are not JSON objects or carry an unparseable date are dropped
/// with a warning. Numeric fields default to 0, identifiers to "".
pub fn normalize_rows(rows: &[Value]) -> Vec<SalesRecord> {
    let mut records: Vec<SalesRecord> = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for (idx, row) in rows.iter().enumerate() {
        let Some(obj) = row.as_object() else {
            warn!("Dropping row {}: not an object", idx);
            dropped += 1;
            continue;
        };

        let Some(date) = parse_date(obj.get(COL_DATE)) else {
            warn!(
                "Dropping row {}: unparseable date {:?}",
                idx,
                obj.get(COL_DATE)
            );
            dropped += 1;
            continue;
        };

        records.push(SalesRecord {
            date,
            total_revenue: parse_number(obj.get(COL_REVENUE)),
            sales_volume: parse_number(obj.get(COL_VOLUME)),
            agent_code: parse_string(obj.get(COL_AGENT)),
            broker_code: parse_string(obj.get(COL_BROKER)),
            product_name: parse_string(obj.get(COL_PRODUCT)),
            customer_region: parse_string(obj.get(COL_REGION)),
        });
    }

    // Stable sort keeps same-day rows in sheet order.
    records.sort_by_key(|r| r.date);

    debug!(
        "Normalized {} rows into {} records ({} dropped)",
        rows.len(),
        records.len(),
        dropped
    );

    records
}

/// Reads a JSON array of raw rows from disk. The loader contract only: the
/// core never does I/O past this edge.
pub fn load_rows_from_json(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    let rows = serde_json::from_str(&content)?;
    Ok(rows)
}
