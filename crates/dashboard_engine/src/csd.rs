//! Service & inventory (CSD) aggregations: KPI cards and chart series for
//! the latest imported month.

use std::collections::HashSet;

use serde::Serialize;

use data_normalization::coerce_number;
use models::{
    CallRecord, InventoryRecord, RISK_HIGH, RISK_NO_RISK, RISK_TOP_HIGH, STATUS_ACTIVE,
    STATUS_CLOSED,
};

use crate::{latest_month, month_display};

#[derive(Debug, Serialize)]
pub struct ServiceCenterCount {
    pub month: String,
    pub centers: usize,
}

/// Unique service centers reporting in the latest month.
pub fn total_service_centers(calls: &[CallRecord]) -> Option<ServiceCenterCount> {
    let month = latest_calls_month(calls)?;
    let centers: HashSet<&str> = for_month(calls, &month).map(|c| c.center.as_str()).collect();
    let centers = centers.len();
    Some(ServiceCenterCount {
        month,
        centers,
    })
}

#[derive(Debug, Serialize)]
pub struct ActiveCenters {
    pub month: String,
    pub active: usize,
    pub total_centers: usize,
    pub percentage: String,
}

/// Centers with 'Active' status in the latest month, with their share of the
/// unique-center total (whole percent, as shown on the card).
pub fn active_service_centers(calls: &[CallRecord]) -> Option<ActiveCenters> {
    let month = latest_calls_month(calls)?;
    let active = for_month(calls, &month)
        .filter(|c| c.status == STATUS_ACTIVE)
        .count();
    let total_centers: usize = for_month(calls, &month)
        .map(|c| c.center.as_str())
        .collect::<HashSet<_>>()
        .len();

    let percentage = if total_centers > 0 {
        format!("{:.0}", active as f64 / total_centers as f64 * 100.0)
    } else {
        "0".to_string()
    };

    Some(ActiveCenters {
        month,
        active,
        total_centers,
        percentage,
    })
}

#[derive(Debug, Serialize)]
pub struct CallTotals {
    pub month: String,
    pub total_calls: i64,
}

pub fn total_calls(calls: &[CallRecord]) -> Option<CallTotals> {
    let month = latest_calls_month(calls)?;
    let total_calls = for_month(calls, &month).map(|c| c.total_calls).sum();
    Some(CallTotals { month, total_calls })
}

#[derive(Debug, Serialize)]
pub struct CancelledCalls {
    pub month: String,
    pub total_calls: i64,
    pub cancelled_calls: i64,
    pub percentage: String,
}

/// Cancelled-call volume for the latest month, with the cancellation share
/// of total calls formatted to one decimal ("10.0"). A zero denominator
/// yields "0.0" rather than an error.
pub fn cancelled_calls(calls: &[CallRecord]) -> Option<CancelledCalls> {
    let month = latest_calls_month(calls)?;
    Some(cancelled_calls_for_month(calls, &month))
}

/// Same summary pinned to an explicit month.
pub fn cancelled_calls_for_month(calls: &[CallRecord], month: &str) -> CancelledCalls {
    let total_calls: i64 = for_month(calls, month).map(|c| c.total_calls).sum();
    let cancelled: i64 = for_month(calls, month).map(|c| c.cancelled_calls).sum();

    let percentage = if total_calls > 0 {
        format!("{:.1}", cancelled as f64 / total_calls as f64 * 100.0)
    } else {
        "0.0".to_string()
    };

    CancelledCalls {
        month: month.to_string(),
        total_calls,
        cancelled_calls: cancelled,
        percentage,
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryValue {
    pub month: String,
    pub total: f64,
}

/// Available + occupied + in-transit inventory value across all centers for
/// the latest month. Values arrive comma-formatted and coerce to 0 when
/// unreadable.
pub fn inventory_value(inventory: &[InventoryRecord]) -> Option<InventoryValue> {
    let month = latest_month(inventory.iter().map(|i| i.month.as_str()))?;
    let total = inventory
        .iter()
        .filter(|i| month_display(&i.month) == month)
        .map(|i| {
            coerce_number(&i.available) + coerce_number(&i.occupied) + coerce_number(&i.in_transit)
        })
        .sum();
    Some(InventoryValue { month, total })
}

#[derive(Debug, Serialize)]
pub struct CenterCallLoad {
    pub center: String,
    pub calls: i64,
    pub cancellations: i64,
}

#[derive(Debug, Serialize)]
pub struct CallPerformance {
    pub month: String,
    pub series: Vec<CenterCallLoad>,
}

/// Per-center call volume for the latest month, one bar pair per record.
/// Center labels are shortened to their first word for axis readability.
pub fn call_performance(calls: &[CallRecord]) -> Option<CallPerformance> {
    let month = latest_calls_month(calls)?;
    let series = for_month(calls, &month)
        .map(|c| CenterCallLoad {
            center: c
                .center
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            calls: c.total_calls,
            cancellations: c.cancelled_calls,
        })
        .collect();
    Some(CallPerformance { month, series })
}

#[derive(Debug, Serialize)]
pub struct StatusBreakdown {
    pub month: String,
    pub active: usize,
    pub closed: usize,
}

pub fn status_breakdown(calls: &[CallRecord]) -> Option<StatusBreakdown> {
    let month = latest_calls_month(calls)?;
    Some(StatusBreakdown {
        active: for_month(calls, &month)
            .filter(|c| c.status == STATUS_ACTIVE)
            .count(),
        closed: for_month(calls, &month)
            .filter(|c| c.status == STATUS_CLOSED)
            .count(),
        month,
    })
}

#[derive(Debug, Serialize)]
pub struct RiskBreakdown {
    pub month: String,
    pub top_high_risk: usize,
    pub high_risk: usize,
    pub no_risk: usize,
}

/// Risk-level counts for the latest month. Unknown risk strings fall into
/// no bucket.
pub fn risk_breakdown(calls: &[CallRecord]) -> Option<RiskBreakdown> {
    let month = latest_calls_month(calls)?;
    Some(RiskBreakdown {
        top_high_risk: for_month(calls, &month)
            .filter(|c| c.risk == RISK_TOP_HIGH)
            .count(),
        high_risk: for_month(calls, &month).filter(|c| c.risk == RISK_HIGH).count(),
        no_risk: for_month(calls, &month)
            .filter(|c| c.risk == RISK_NO_RISK)
            .count(),
        month,
    })
}

#[derive(Debug, Serialize)]
pub struct CenterMonthSummaries {
    pub calls: Option<String>,
    pub inventory: Option<String>,
}

/// One-line summaries of a single (month, center) slice, in the form the
/// trend-analysis prompt expects. `None` when that center has no record for
/// the month.
pub fn center_month_summaries(
    calls: &[CallRecord],
    inventory: &[InventoryRecord],
    month: &str,
    center: &str,
) -> CenterMonthSummaries {
    let calls_summary = calls
        .iter()
        .find(|c| month_display(&c.month) == month && c.center == center)
        .map(|c| {
            format!(
                "Total calls: {}, Cancelled calls: {}",
                c.total_calls, c.cancelled_calls
            )
        });

    let inventory_summary = inventory
        .iter()
        .find(|i| month_display(&i.month) == month && i.center == center)
        .map(|i| {
            format!(
                "Available: {}, Occupied: {}, In-transit: {}",
                i.available, i.occupied, i.in_transit
            )
        });

    CenterMonthSummaries {
        calls: calls_summary,
        inventory: inventory_summary,
    }
}

fn latest_calls_month(calls: &[CallRecord]) -> Option<String> {
    latest_month(calls.iter().map(|c| c.month.as_str()))
}

fn for_month<'a>(calls: &'a [CallRecord], month: &'a str) -> impl Iterator<Item = &'a CallRecord> {
    calls.iter().filter(move |c| month_display(&c.month) == month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(month: &str, center: &str, status: &str, risk: &str, total: i64, cancelled: i64) -> CallRecord {
        CallRecord {
            month: month.to_string(),
            center: center.to_string(),
            status: status.to_string(),
            risk: risk.to_string(),
            total_calls: total,
            cancelled_calls: cancelled,
            ..Default::default()
        }
    }

    fn inventory(month: &str, center: &str, available: &str, occupied: &str, in_transit: &str) -> InventoryRecord {
        InventoryRecord {
            month: month.to_string(),
            center: center.to_string(),
            available: available.to_string(),
            occupied: occupied.to_string(),
            in_transit: in_transit.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cancelled_calls_sums_and_percentage() {
        let calls = vec![
            call("May", "North", "Active", "No Risk", 100, 10),
            call("May", "South", "Active", "No Risk", 50, 5),
        ];
        let summary = cancelled_calls_for_month(&calls, "May");
        assert_eq!(summary.cancelled_calls, 15);
        assert_eq!(summary.total_calls, 150);
        assert_eq!(summary.percentage, "10.0");
    }

    #[test]
    fn test_cancelled_calls_zero_denominator() {
        let calls = vec![call("May", "North", "Active", "No Risk", 0, 0)];
        let summary = cancelled_calls_for_month(&calls, "May");
        assert_eq!(summary.percentage, "0.0");
    }

    #[test]
    fn test_kpis_use_latest_month_only() {
        let calls = vec![
            call("May", "North", "Active", "No Risk", 100, 10),
            call("June", "North", "Active", "No Risk", 80, 4),
            call("June", "South", "Closed", "High Risk", 20, 2),
        ];

        let totals = total_calls(&calls).unwrap();
        assert_eq!(totals.month, "June");
        assert_eq!(totals.total_calls, 100);

        let centers = total_service_centers(&calls).unwrap();
        assert_eq!(centers.centers, 2);

        let active = active_service_centers(&calls).unwrap();
        assert_eq!(active.active, 1);
        assert_eq!(active.total_centers, 2);
        assert_eq!(active.percentage, "50");
    }

    #[test]
    fn test_status_and_risk_breakdowns() {
        let calls = vec![
            call("May", "North", "Active", "Top High Risk", 10, 1),
            call("May", "South", "Closed", "High Risk", 10, 1),
            call("May", "East", "Active", "No Risk", 10, 1),
            call("May", "West", "Active", "Watch", 10, 1),
        ];

        let status = status_breakdown(&calls).unwrap();
        assert_eq!((status.active, status.closed), (3, 1));

        let risk = risk_breakdown(&calls).unwrap();
        assert_eq!(risk.top_high_risk, 1);
        assert_eq!(risk.high_risk, 1);
        assert_eq!(risk.no_risk, 1);
    }

    #[test]
    fn test_inventory_value_coerces_comma_strings() {
        let rows = vec![
            inventory("May", "North", "1,200", "300", "55"),
            inventory("May", "South", "not-a-number", "100", "0"),
        ];
        let value = inventory_value(&rows).unwrap();
        assert_eq!(value.total, 1655.0);
    }

    #[test]
    fn test_call_performance_shortens_center_names() {
        let calls = vec![call("May", "North Hub Services", "Active", "No Risk", 9, 1)];
        let chart = call_performance(&calls).unwrap();
        assert_eq!(chart.series[0].center, "North");
    }

    #[test]
    fn test_center_month_summaries() {
        let calls = vec![call("May", "North", "Active", "No Risk", 120, 12)];
        let rows = vec![inventory("May", "North", "1,200", "300", "55")];

        let summaries = center_month_summaries(&calls, &rows, "May", "North");
        assert_eq!(
            summaries.calls.as_deref(),
            Some("Total calls: 120, Cancelled calls: 12")
        );
        assert_eq!(
            summaries.inventory.as_deref(),
            Some("Available: 1,200, Occupied: 300, In-transit: 55")
        );

        let missing = center_month_summaries(&calls, &rows, "May", "South");
        assert!(missing.calls.is_none());
        assert!(missing.inventory.is_none());
    }

    #[test]
    fn test_empty_records_yield_none() {
        assert!(total_calls(&[]).is_none());
        assert!(inventory_value(&[]).is_none());
    }
}
