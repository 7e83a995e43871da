use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized sales transaction. Immutable after normalization: revenue
/// and volume are non-negative, identifier fields default to the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub sales_volume: f64,
    pub agent_code: String,
    pub broker_code: String,
    pub product_name: String,
    pub customer_region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Supervisor,
    Broker,
    Agent,
}

/// Who is looking at the dashboard. The role fixes the baseline visibility
/// scope; `code` identifies "own records" for broker and agent roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub role: Role,
    pub code: String,
}

impl UserIdentity {
    pub fn new(role: Role, code: impl Into<String>) -> Self {
        Self {
            role,
            code: code.into(),
        }
    }
}

/// Aggregation granularity requested by the presentation layer. Affects how
/// series are bucketed, never which records are included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonMode {
    #[default]
    #[serde(rename = "mom")]
    MonthOverMonth,
    #[serde(rename = "qoq")]
    QuarterOverQuarter,
    #[serde(rename = "yoy")]
    YearOverYear,
    #[serde(rename = "ytd")]
    YearToDate,
}

/// Which measure a time series is built over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Revenue,
    Volume,
}

/// User-selected constraints, all optional. Every active predicate must hold
/// for a record to survive (AND semantics); role scope is applied first and
/// cannot be widened by any of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub agent_code: Option<String>,
    pub broker_code: Option<String>,
    pub region: Option<String>,
    pub product_name: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub time_frame: TimeFrame,
    pub comparison_type: ComparisonMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_mode_serde_tags() {
        let json = serde_json::to_string(&ComparisonMode::MonthOverMonth).unwrap();
        assert_eq!(json, "\"mom\"");

        let mode: ComparisonMode = serde_json::from_str("\"ytd\"").unwrap();
        assert_eq!(mode, ComparisonMode::YearToDate);
    }

    #[test]
    fn test_criteria_default_is_empty() {
        let criteria = FilterCriteria::default();
        assert!(criteria.agent_code.is_none());
        assert!(criteria.date_from.is_none());
        assert_eq!(criteria.time_frame, TimeFrame::Monthly);
        assert_eq!(criteria.comparison_type, ComparisonMode::MonthOverMonth);
    }

    #[test]
    fn test_record_roundtrip() {
        let record = SalesRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            total_revenue: 1250.0,
            sales_volume: 3.0,
            agent_code: "AGT001".to_string(),
            broker_code: "BRK001".to_string(),
            product_name: "Life Cover".to_string(),
            customer_region: "North".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: SalesRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
