//! Pre-sales bid aggregations: funnel KPIs and monthly chart series.

use serde::Serialize;

use data_normalization::{MonthKey, RawMonth, coerce_number, coerce_percent, normalize_month};
use models::BidRecord;

use crate::{latest_month, month_display};

pub fn latest_bid_month(bids: &[BidRecord]) -> Option<String> {
    latest_month(bids.iter().map(|b| b.month.as_str()))
}

#[derive(Debug, Serialize)]
pub struct MonthlyBidTotal {
    pub month: String,
    pub submitted: i64,
}

/// Bids submitted in the latest month.
pub fn total_bids(bids: &[BidRecord]) -> Option<MonthlyBidTotal> {
    let month = latest_bid_month(bids)?;
    let submitted = bids
        .iter()
        .filter(|b| month_display(&b.month) == month)
        .map(|b| b.bid_submission)
        .sum();
    Some(MonthlyBidTotal { month, submitted })
}

#[derive(Debug, Serialize)]
pub struct WinRate {
    pub won: i64,
    pub submitted: i64,
    pub rate: f64,
}

/// Overall win rate: total won over total submitted across the whole set,
/// as a 0–100 percentage; 0 when nothing was submitted.
pub fn win_rate(bids: &[BidRecord]) -> WinRate {
    let won: i64 = bids.iter().map(|b| b.won).sum();
    let submitted: i64 = bids.iter().map(|b| b.bid_submission).sum();
    WinRate {
        won,
        submitted,
        rate: ratio(won, submitted),
    }
}

/// Total value of won bids across all months (comma-coerced).
pub fn total_won_value(bids: &[BidRecord]) -> f64 {
    bids.iter().map(|b| coerce_number(&b.won_value)).sum()
}

#[derive(Debug, Serialize)]
pub struct QualificationRate {
    pub qualified: i64,
    pub submitted: i64,
    pub rate: f64,
}

/// Technically qualified bids over submitted bids, whole set.
pub fn tech_qualification_rate(bids: &[BidRecord]) -> QualificationRate {
    let qualified: i64 = bids.iter().map(|b| b.tech_qualified_bids).sum();
    let submitted: i64 = bids.iter().map(|b| b.bid_submission).sum();
    QualificationRate {
        qualified,
        submitted,
        rate: ratio(qualified, submitted),
    }
}

#[derive(Debug, Serialize)]
pub struct GoNoGoRatio {
    pub go: i64,
    pub evaluated: i64,
    pub rate: f64,
}

/// GO decisions over all go/no-go evaluations, whole set.
pub fn go_no_go_ratio(bids: &[BidRecord]) -> GoNoGoRatio {
    let go: i64 = bids.iter().map(|b| b.go).sum();
    let evaluated: i64 = bids.iter().map(|b| b.go_no_go).sum();
    GoNoGoRatio {
        go,
        evaluated,
        rate: ratio(go, evaluated),
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyBidPerformance {
    pub month: String,
    pub submitted: i64,
    pub won: i64,
    pub lost: i64,
}

/// Submitted/won/lost per month, chronologically sorted.
pub fn monthly_performance(bids: &[BidRecord]) -> Vec<MonthlyBidPerformance> {
    sorted_month_groups(bids)
        .into_iter()
        .map(|(key, rows)| MonthlyBidPerformance {
            month: key.display,
            submitted: rows.iter().map(|b| b.bid_submission).sum(),
            won: rows.iter().map(|b| b.won).sum(),
            lost: rows.iter().map(|b| b.lost).sum(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct QualificationPoint {
    pub month: String,
    pub tech_qualified: f64,
    pub fin_qualified: f64,
}

/// Tech vs financial qualification percentages per month. There is one bid
/// row per month; if duplicates appear the last row wins.
pub fn qualification_trend(bids: &[BidRecord]) -> Vec<QualificationPoint> {
    sorted_month_groups(bids)
        .into_iter()
        .filter_map(|(key, rows)| {
            rows.last().map(|last| QualificationPoint {
                month: key.display,
                tech_qualified: coerce_percent(&last.tech_qualified_percent),
                fin_qualified: coerce_percent(&last.fin_qualified_percent),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct MsRrPoint {
    pub month: String,
    pub ms: i64,
    pub rr: i64,
}

/// Managed-services vs repair-and-refurbishment bid counts per month.
pub fn ms_rr_trend(bids: &[BidRecord]) -> Vec<MsRrPoint> {
    sorted_month_groups(bids)
        .into_iter()
        .map(|(key, rows)| MsRrPoint {
            month: key.display,
            ms: rows.iter().map(|b| b.ms).sum(),
            rr: rows.iter().map(|b| b.rr).sum(),
        })
        .collect()
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64 * 100.0
    } else {
        0.0
    }
}

/// Groups records by canonical month display, dropping rows whose month
/// normalizes to an empty display (they stay visible in raw tables but not
/// in series), sorted chronologically. Ties keep record order.
fn sorted_month_groups(bids: &[BidRecord]) -> Vec<(MonthKey, Vec<&BidRecord>)> {
    let mut groups: Vec<(MonthKey, Vec<&BidRecord>)> = Vec::new();
    for bid in bids {
        let key = normalize_month(RawMonth::Text(&bid.month));
        if key.display.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|(k, _)| k.display == key.display) {
            Some((_, rows)) => rows.push(bid),
            None => groups.push((key, vec![bid])),
        }
    }
    groups.sort_by_key(|(k, _)| k.sort_key());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(month: &str) -> BidRecord {
        BidRecord {
            month: month.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_win_rate_over_whole_set() {
        let bids = vec![
            BidRecord {
                won: 10,
                bid_submission: 40,
                ..bid("Jan-25")
            },
            BidRecord {
                won: 5,
                bid_submission: 20,
                ..bid("Feb-25")
            },
        ];
        let rate = win_rate(&bids);
        assert_eq!(rate.won, 15);
        assert_eq!(rate.submitted, 60);
        assert_eq!(rate.rate, 25.0);
    }

    #[test]
    fn test_win_rate_zero_denominator() {
        let bids = vec![BidRecord { won: 3, ..bid("Jan-25") }];
        assert_eq!(win_rate(&bids).rate, 0.0);
    }

    #[test]
    fn test_total_bids_is_latest_month_only() {
        let bids = vec![
            BidRecord {
                bid_submission: 40,
                ..bid("Jan-25")
            },
            BidRecord {
                bid_submission: 25,
                ..bid("Feb-25")
            },
        ];
        let totals = total_bids(&bids).unwrap();
        assert_eq!(totals.month, "Feb-25");
        assert_eq!(totals.submitted, 25);
    }

    #[test]
    fn test_monthly_performance_sorted_chronologically() {
        let bids = vec![
            BidRecord {
                bid_submission: 30,
                won: 3,
                lost: 7,
                ..bid("Feb-25")
            },
            BidRecord {
                bid_submission: 40,
                won: 10,
                lost: 5,
                ..bid("Dec-24")
            },
            BidRecord {
                bid_submission: 20,
                won: 2,
                lost: 1,
                ..bid("Jan-25")
            },
        ];

        let series = monthly_performance(&bids);
        let months: Vec<&str> = series.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["Dec-24", "Jan-25", "Feb-25"]);
        assert_eq!(series[0].submitted, 40);
    }

    #[test]
    fn test_empty_month_dropped_from_series() {
        let bids = vec![bid(""), BidRecord { ms: 4, rr: 2, ..bid("Jan-25") }];
        let series = ms_rr_trend(&bids);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].ms, 4);
    }

    #[test]
    fn test_qualification_trend_detects_percent_forms() {
        let bids = vec![
            BidRecord {
                tech_qualified_percent: "0.45".to_string(),
                fin_qualified_percent: "30%".to_string(),
                ..bid("Jan-25")
            },
            BidRecord {
                tech_qualified_percent: "62.5".to_string(),
                fin_qualified_percent: "0.5".to_string(),
                ..bid("Feb-25")
            },
        ];

        let series = qualification_trend(&bids);
        assert_eq!(series[0].tech_qualified, 45.0);
        assert_eq!(series[0].fin_qualified, 30.0);
        assert_eq!(series[1].tech_qualified, 62.5);
        assert_eq!(series[1].fin_qualified, 50.0);
    }

    #[test]
    fn test_total_won_value_coerces_commas() {
        let bids = vec![
            BidRecord {
                won_value: "1,50,000".to_string(),
                ..bid("Jan-25")
            },
            BidRecord {
                won_value: "junk".to_string(),
                ..bid("Feb-25")
            },
        ];
        assert_eq!(total_won_value(&bids), 150000.0);
    }
}
