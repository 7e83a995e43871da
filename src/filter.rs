//! Role-aware record filtering.
//!
//! Role scope comes first and cannot be widened by user filters: an agent only
//! ever sees their own records, a broker their book, a supervisor everything.
//! User criteria then narrow the remainder with AND semantics.

use crate::record::{FilterCriteria, Role, SalesRecord, UserIdentity};
use serde::{Deserialize, Serialize};

pub(crate) fn role_scope_allows(record: &SalesRecord, identity: &UserIdentity) -> bool {
    match identity.role {
        Role::Agent => record.agent_code == identity.code,
        Role::Broker => record.broker_code == identity.code,
        Role::Supervisor => true,
    }
}

/// Criteria predicates that are not date bounds. The span-comparison routine
/// reuses these on the full pool before re-windowing.
pub(crate) fn criteria_allows(
    record: &SalesRecord,
    identity: &UserIdentity,
    criteria: &FilterCriteria,
) -> bool {
    if let Some(agent) = non_empty(&criteria.agent_code) {
        // Agents are already pinned to their own code by role scope.
        if identity.role != Role::Agent && record.agent_code != agent {
            return false;
        }
    }

    if let Some(broker) = non_empty(&criteria.broker_code) {
        if identity.role == Role::Supervisor && record.broker_code != broker {
            return false;
        }
    }

    if let Some(region) = non_empty(&criteria.region) {
        if record.customer_region != region {
            return false;
        }
    }

    if let Some(product) = non_empty(&criteria.product_name) {
        if record.product_name != product {
            return false;
        }
    }

    true
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Applies role scope, then user criteria, then inclusive date bounds.
///
/// Returns a fresh subset; the input is never mutated. With a supervisor
/// identity and empty criteria this is the identity function, and applying
/// the same filter twice yields the same subset.
pub fn apply_filters(
    records: &[SalesRecord],
    identity: &UserIdentity,
    criteria: &FilterCriteria,
) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|r| role_scope_allows(r, identity))
        .filter(|r| criteria_allows(r, identity, criteria))
        .filter(|r| criteria.date_from.map_or(true, |from| r.date >= from))
        .filter(|r| criteria.date_to.map_or(true, |to| r.date <= to))
        .cloned()
        .collect()
}

/// Distinct filterable values present in a record set, for presentation
/// dropdowns. Empty identifiers are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub agents: Vec<String>,
    pub brokers: Vec<String>,
    pub regions: Vec<String>,
    pub products: Vec<String>,
}

pub fn filter_options(records: &[SalesRecord]) -> FilterOptions {
    let mut options = FilterOptions {
        agents: records.iter().map(|r| r.agent_code.clone()).collect(),
        brokers: records.iter().map(|r| r.broker_code.clone()).collect(),
        regions: records.iter().map(|r| r.customer_region.clone()).collect(),
        products: records.iter().map(|r| r.product_name.clone()).collect(),
    };

    for list in [
        &mut options.agents,
        &mut options.brokers,
        &mut options.regions,
        &mut options.products,
    ] {
        list.retain(|v| !v.is_empty());
        list.sort();
        list.dedup();
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: (i32, u32, u32), agent: &str, broker: &str, region: &str) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            total_revenue: 100.0,
            sales_volume: 1.0,
            agent_code: agent.to_string(),
            broker_code: broker.to_string(),
            product_name: "Term Life".to_string(),
            customer_region: region.to_string(),
        }
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            record((2024, 1, 10), "AGT001", "BRK001", "North"),
            record((2024, 2, 10), "AGT002", "BRK001", "South"),
            record((2024, 3, 10), "AGT003", "BRK002", "North"),
        ]
    }

    #[test]
    fn test_supervisor_with_empty_criteria_is_identity() {
        let records = sample();
        let identity = UserIdentity::new(Role::Supervisor, "SUP001");
        let filtered = apply_filters(&records, &identity, &FilterCriteria::default());
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_agent_sees_only_own_records() {
        let records = sample();
        let identity = UserIdentity::new(Role::Agent, "AGT002");
        let filtered = apply_filters(&records, &identity, &FilterCriteria::default());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].agent_code, "AGT002");
    }

    #[test]
    fn test_agent_cannot_widen_scope_via_criteria() {
        let records = sample();
        let identity = UserIdentity::new(Role::Agent, "AGT001");
        let criteria = FilterCriteria {
            agent_code: Some("AGT999".to_string()),
            ..Default::default()
        };
        let filtered = apply_filters(&records, &identity, &criteria);
        assert_eq!(filtered.len(), 1, "agent filter criterion must be ignored");
        assert_eq!(filtered[0].agent_code, "AGT001");
    }

    #[test]
    fn test_broker_scope_and_broker_criterion_ignored() {
        let records = sample();
        let identity = UserIdentity::new(Role::Broker, "BRK001");
        let criteria = FilterCriteria {
            broker_code: Some("BRK002".to_string()),
            ..Default::default()
        };
        let filtered = apply_filters(&records, &identity, &criteria);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.broker_code == "BRK001"));
    }

    #[test]
    fn test_supervisor_can_filter_by_broker() {
        let records = sample();
        let identity = UserIdentity::new(Role::Supervisor, "SUP001");
        let criteria = FilterCriteria {
            broker_code: Some("BRK002".to_string()),
            ..Default::default()
        };
        let filtered = apply_filters(&records, &identity, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].broker_code, "BRK002");
    }

    #[test]
    fn test_region_exact_match() {
        let records = sample();
        let identity = UserIdentity::new(Role::Supervisor, "SUP001");
        let criteria = FilterCriteria {
            region: Some("North".to_string()),
            ..Default::default()
        };
        let filtered = apply_filters(&records, &identity, &criteria);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_empty_string_criterion_is_inactive() {
        let records = sample();
        let identity = UserIdentity::new(Role::Supervisor, "SUP001");
        let criteria = FilterCriteria {
            region: Some(String::new()),
            ..Default::default()
        };
        let filtered = apply_filters(&records, &identity, &criteria);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_date_bounds_inclusive() {
        let records = sample();
        let identity = UserIdentity::new(Role::Supervisor, "SUP001");
        let criteria = FilterCriteria {
            date_from: NaiveDate::from_ymd_opt(2024, 2, 10),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        };
        let filtered = apply_filters(&records, &identity, &criteria);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let identity = UserIdentity::new(Role::Broker, "BRK001");
        let criteria = FilterCriteria {
            region: Some("North".to_string()),
            ..Default::default()
        };
        let once = apply_filters(&records, &identity, &criteria);
        let twice = apply_filters(&once, &identity, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_options_sorted_and_deduped() {
        let records = vec![
            record((2024, 1, 1), "AGT002", "BRK001", "South"),
            record((2024, 1, 2), "AGT001", "BRK001", "North"),
            record((2024, 1, 3), "", "BRK002", "South"),
        ];
        let options = filter_options(&records);
        assert_eq!(options.agents, vec!["AGT001", "AGT002"]);
        assert_eq!(options.brokers, vec!["BRK001", "BRK002"]);
        assert_eq!(options.regions, vec!["North", "South"]);
    }
}
