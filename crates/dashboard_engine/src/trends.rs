//! Month-to-month comparison: per-entity values across 2–3 selected months
//! and the deltas between consecutive selections.
//!
//! Months are compared in selection order, not chronological order — the
//! pickers are independently selectable and this engine does not re-sort
//! them. A caller who wants chronological deltas selects chronologically.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use data_normalization::coerce_number;
use models::{BidRecord, CallRecord, InventoryRecord};

use crate::month_display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CsdMetric {
    TotalCalls,
    CancelledCalls,
    InventoryConsumption,
}

impl CsdMetric {
    /// Presentation policy: whether a falling value is the good direction
    /// (fewer cancelled calls is an improvement).
    pub fn decrease_is_good(self) -> bool {
        matches!(self, CsdMetric::CancelledCalls)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BidMetric {
    BidSubmission,
    Won,
    Lost,
}

impl BidMetric {
    fn value(self, bid: &BidRecord) -> i64 {
        match self {
            BidMetric::BidSubmission => bid.bid_submission,
            BidMetric::Won => bid.won,
            BidMetric::Lost => bid.lost,
        }
    }
}

/// One comparison table row: an entity's display value per selected month
/// ("N/A" where it has no record) and the numeric delta for each consecutive
/// pair of selections (absent months count as 0).
#[derive(Debug, Serialize)]
pub struct ComparisonRow {
    pub entity: String,
    pub values: Vec<String>,
    pub deltas: Vec<f64>,
}

/// Compares service centers across the selected months.
///
/// `statuses` filters call records before comparison; inventory rows (which
/// carry no status) are restricted to centers present in the status-filtered
/// calls. `centers` narrows the compared entities; empty means every center
/// seen in the calls data, sorted.
pub fn compare_csd_months(
    calls: &[CallRecord],
    inventory: &[InventoryRecord],
    months: &[String],
    centers: &[String],
    statuses: &[String],
    metric: CsdMetric,
) -> Vec<ComparisonRow> {
    if months.len() < 2 {
        return Vec::new();
    }

    let filtered_calls: Vec<&CallRecord> = calls
        .iter()
        .filter(|c| statuses.is_empty() || statuses.contains(&c.status))
        .collect();

    let entities: Vec<String> = if centers.is_empty() {
        let mut all: Vec<String> = calls
            .iter()
            .map(|c| c.center.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        all.sort();
        all
    } else {
        centers.to_vec()
    };

    let allowed_centers: HashSet<&str> =
        filtered_calls.iter().map(|c| c.center.as_str()).collect();

    entities
        .into_iter()
        .filter(|entity| {
            // Status filtering reaches inventory through the center set.
            metric != CsdMetric::InventoryConsumption || allowed_centers.contains(entity.as_str())
        })
        .map(|entity| {
            let cells: Vec<Option<(String, f64)>> = months
                .iter()
                .map(|month| match metric {
                    CsdMetric::TotalCalls => filtered_calls
                        .iter()
                        .find(|c| month_display(&c.month) == *month && c.center == entity)
                        .map(|c| (c.total_calls.to_string(), c.total_calls as f64)),
                    CsdMetric::CancelledCalls => filtered_calls
                        .iter()
                        .find(|c| month_display(&c.month) == *month && c.center == entity)
                        .map(|c| (c.cancelled_calls.to_string(), c.cancelled_calls as f64)),
                    CsdMetric::InventoryConsumption => inventory
                        .iter()
                        .filter(|i| allowed_centers.contains(i.center.as_str()))
                        .find(|i| month_display(&i.month) == *month && i.center == entity)
                        // Consumption keeps its raw cell text for display.
                        .map(|i| (i.consumption.clone(), coerce_number(&i.consumption))),
                })
                .collect();

            build_row(entity, cells)
        })
        .collect()
}

/// Compares one bid metric across the selected months. Bids carry no entity
/// dimension, so the result is a single row; a month with no record shows
/// "N/A" and contributes 0 to its delta.
pub fn compare_bid_months(
    bids: &[BidRecord],
    months: &[String],
    metric: BidMetric,
) -> Option<ComparisonRow> {
    if months.len() < 2 {
        return None;
    }

    let cells: Vec<Option<(String, f64)>> = months
        .iter()
        .map(|month| {
            bids.iter()
                .find(|b| month_display(&b.month) == *month)
                .map(|b| {
                    let value = metric.value(b);
                    (value.to_string(), value as f64)
                })
        })
        .collect();

    Some(build_row("Value".to_string(), cells))
}

fn build_row(entity: String, cells: Vec<Option<(String, f64)>>) -> ComparisonRow {
    let values = cells
        .iter()
        .map(|cell| match cell {
            Some((display, _)) => display.clone(),
            None => "N/A".to_string(),
        })
        .collect();

    let numeric: Vec<f64> = cells
        .iter()
        .map(|cell| cell.as_ref().map(|(_, n)| *n).unwrap_or(0.0))
        .collect();
    let deltas = numeric.windows(2).map(|pair| pair[1] - pair[0]).collect();

    ComparisonRow {
        entity,
        values,
        deltas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(month: &str, center: &str, status: &str, total: i64, cancelled: i64) -> CallRecord {
        CallRecord {
            month: month.to_string(),
            center: center.to_string(),
            status: status.to_string(),
            total_calls: total,
            cancelled_calls: cancelled,
            ..Default::default()
        }
    }

    fn months(list: &[&str]) -> Vec<String> {
        list.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_absent_entity_shows_na_and_zero_baseline() {
        let calls = vec![call("Feb-25", "Acme", "Active", 30, 0)];
        let rows = compare_csd_months(
            &calls,
            &[],
            &months(&["Jan-25", "Feb-25"]),
            &months(&["Acme"]),
            &[],
            CsdMetric::TotalCalls,
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values, vec!["N/A", "30"]);
        assert_eq!(rows[0].deltas, vec![30.0]);
    }

    #[test]
    fn test_three_month_deltas_in_selection_order() {
        let calls = vec![
            call("Jan-25", "Acme", "Active", 10, 0),
            call("Feb-25", "Acme", "Active", 25, 0),
            call("Mar-25", "Acme", "Active", 15, 0),
        ];
        // Deliberately non-chronological selection: the engine must not
        // re-sort.
        let rows = compare_csd_months(
            &calls,
            &[],
            &months(&["Mar-25", "Jan-25", "Feb-25"]),
            &months(&["Acme"]),
            &[],
            CsdMetric::TotalCalls,
        );

        assert_eq!(rows[0].values, vec!["15", "10", "25"]);
        assert_eq!(rows[0].deltas, vec![-5.0, 15.0]);
    }

    #[test]
    fn test_status_filter_reaches_inventory_through_centers() {
        let calls = vec![
            call("Jan-25", "Acme", "Active", 10, 0),
            call("Jan-25", "Zenith", "Closed", 10, 0),
        ];
        let inventory = vec![
            InventoryRecord {
                month: "Jan-25".to_string(),
                center: "Acme".to_string(),
                consumption: "1,200".to_string(),
                ..Default::default()
            },
            InventoryRecord {
                month: "Jan-25".to_string(),
                center: "Zenith".to_string(),
                consumption: "900".to_string(),
                ..Default::default()
            },
        ];

        let rows = compare_csd_months(
            &calls,
            &inventory,
            &months(&["Jan-25", "Feb-25"]),
            &[],
            &months(&["Active"]),
            CsdMetric::InventoryConsumption,
        );

        // Zenith is filtered out entirely; Acme keeps its raw display text.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity, "Acme");
        assert_eq!(rows[0].values, vec!["1,200", "N/A"]);
        assert_eq!(rows[0].deltas, vec![-1200.0]);
    }

    #[test]
    fn test_fewer_than_two_months_is_empty() {
        let calls = vec![call("Jan-25", "Acme", "Active", 10, 0)];
        assert!(
            compare_csd_months(
                &calls,
                &[],
                &months(&["Jan-25"]),
                &[],
                &[],
                CsdMetric::TotalCalls
            )
            .is_empty()
        );
    }

    #[test]
    fn test_bid_comparison_single_row() {
        let bids = vec![
            BidRecord {
                month: "Jan-25".to_string(),
                won: 4,
                ..Default::default()
            },
            BidRecord {
                month: "Feb-25".to_string(),
                won: 9,
                ..Default::default()
            },
        ];

        let row =
            compare_bid_months(&bids, &months(&["Jan-25", "Feb-25", "Mar-25"]), BidMetric::Won)
                .unwrap();
        assert_eq!(row.entity, "Value");
        assert_eq!(row.values, vec!["4", "9", "N/A"]);
        assert_eq!(row.deltas, vec![5.0, -9.0]);
    }

    #[test]
    fn test_cancelled_calls_inverts_good_direction() {
        assert!(CsdMetric::CancelledCalls.decrease_is_good());
        assert!(!CsdMetric::TotalCalls.decrease_is_good());
    }
}
