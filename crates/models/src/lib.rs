use serde::{Deserialize, Serialize};

/// Positional column order of the "Calls" sheet. The decoder binds cells by
/// index, so these arrays are the contract with the workbook layout.
pub const CALLS_COLUMNS: [&str; 7] = [
    "month",
    "center",
    "scCode",
    "risk",
    "status",
    "totalCalls",
    "cancelledCalls",
];

/// Positional column order of the "Inventory" sheet.
pub const INVENTORY_COLUMNS: [&str; 6] = [
    "month",
    "center",
    "consumption",
    "available",
    "occupied",
    "inTransit",
];

/// Positional column order of the "Bids" sheet (one row per month).
pub const BIDS_COLUMNS: [&str; 25] = [
    "month",
    "noOfBid",
    "goNoGo",
    "go",
    "noGo",
    "pqtqStage",
    "commercialFinalization",
    "bidSubmission",
    "pqtqEvaluation",
    "financialEvaluation",
    "won",
    "lost",
    "cancelled",
    "dropped",
    "techQualifiedPercent",
    "techQualifiedBids",
    "finQualifiedPercent",
    "finQualifiedBids",
    "quotedPrice",
    "openProspects",
    "wonValue",
    "lostValue",
    "poValue",
    "rr",
    "ms",
];

// Risk/status values the dashboards match on. Kept as plain strings on the
// records so a dirty cell never fails decode; unknown values simply don't
// match any bucket.
pub const RISK_NO_RISK: &str = "No Risk";
pub const RISK_HIGH: &str = "High Risk";
pub const RISK_TOP_HIGH: &str = "Top High Risk";

pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_CLOSED: &str = "Closed";

/// One row of the "Calls" sheet: call volume per (month, service center).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub center: String,
    #[serde(default)]
    pub sc_code: String,
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_calls: i64,
    #[serde(default)]
    pub cancelled_calls: i64,
}

/// One row of the "Inventory" sheet. The amount fields keep the raw cell text
/// (often comma-formatted, e.g. "1,234") so tables and exports show what was
/// imported; the aggregation engine coerces them when it needs numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub center: String,
    #[serde(default)]
    pub consumption: String,
    #[serde(default)]
    pub available: String,
    #[serde(default)]
    pub occupied: String,
    #[serde(default)]
    pub in_transit: String,
}

/// One row of the "Bids" sheet: the full pre-sales funnel for one month.
///
/// Count fields decode leniently to integers. Percent fields may arrive as a
/// fraction (0.45) or as text ("45%") and money fields as comma-formatted
/// text, so both stay raw strings until the engine normalizes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub no_of_bid: i64,
    #[serde(default)]
    pub go_no_go: i64,
    #[serde(default)]
    pub go: i64,
    #[serde(default)]
    pub no_go: i64,
    #[serde(default)]
    pub pqtq_stage: i64,
    #[serde(default)]
    pub commercial_finalization: i64,
    #[serde(default)]
    pub bid_submission: i64,
    #[serde(default)]
    pub pqtq_evaluation: i64,
    #[serde(default)]
    pub financial_evaluation: i64,
    #[serde(default)]
    pub won: i64,
    #[serde(default)]
    pub lost: i64,
    #[serde(default)]
    pub cancelled: i64,
    #[serde(default)]
    pub dropped: i64,
    #[serde(default)]
    pub tech_qualified_percent: String,
    #[serde(default)]
    pub tech_qualified_bids: i64,
    #[serde(default)]
    pub fin_qualified_percent: String,
    #[serde(default)]
    pub fin_qualified_bids: i64,
    #[serde(default)]
    pub quoted_price: String,
    #[serde(default)]
    pub open_prospects: i64,
    #[serde(default)]
    pub won_value: String,
    #[serde(default)]
    pub lost_value: String,
    #[serde(default)]
    pub po_value: String,
    #[serde(default)]
    pub rr: i64,
    #[serde(default)]
    pub ms: i64,
}

/// A user document from the `users` collection. The identity service owns
/// these; this side only reads them and updates the `roles` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The report sections a viewer can be granted access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSection {
    Csd,
    Presales,
}

impl ReportSection {
    pub const ALL: [ReportSection; 2] = [ReportSection::Csd, ReportSection::Presales];

    /// The role string that grants access to this section.
    pub fn role(self) -> &'static str {
        match self {
            ReportSection::Csd => "csd",
            ReportSection::Presales => "presales",
        }
    }
}

/// Report sections visible to a holder of `roles`. An `admin` role sees
/// every section; otherwise the section's own role is required.
pub fn visible_reports(roles: &[String]) -> Vec<ReportSection> {
    let is_admin = roles.iter().any(|r| r == "admin");
    ReportSection::ALL
        .into_iter()
        .filter(|section| is_admin || roles.iter().any(|r| r == section.role()))
        .collect()
}
