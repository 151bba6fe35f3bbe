//! Pre-sales bid analysis endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use dashboard_engine::trends::{BidMetric, compare_bid_months};
use dashboard_engine::{distinct_months, month_display, presales};

use crate::error::Result;
use crate::handlers::{CompareResponse, ExportQuery, download, validate_month_selection};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PresalesSummary {
    pub total_bids: Option<presales::MonthlyBidTotal>,
    pub win_rate: presales::WinRate,
    pub total_won_value: f64,
    pub tech_qualification_rate: presales::QualificationRate,
    pub go_no_go_ratio: presales::GoNoGoRatio,
}

/// GET /api/presales/summary
pub async fn presales_summary(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let bids = store::load_bids(&*state.store)?;
    Ok(Json(PresalesSummary {
        total_bids: presales::total_bids(&bids),
        win_rate: presales::win_rate(&bids),
        total_won_value: presales::total_won_value(&bids),
        tech_qualification_rate: presales::tech_qualification_rate(&bids),
        go_no_go_ratio: presales::go_no_go_ratio(&bids),
    }))
}

/// GET /api/presales/monthly-performance
pub async fn monthly_performance(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let bids = store::load_bids(&*state.store)?;
    Ok(Json(presales::monthly_performance(&bids)))
}

/// GET /api/presales/qualification-trend
pub async fn qualification_trend(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let bids = store::load_bids(&*state.store)?;
    Ok(Json(presales::qualification_trend(&bids)))
}

/// GET /api/presales/ms-rr-trend
pub async fn ms_rr_trend(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let bids = store::load_bids(&*state.store)?;
    Ok(Json(presales::ms_rr_trend(&bids)))
}

/// GET /api/presales/bids
/// The full bids table, in stored order.
pub async fn presales_bids(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(store::load_bids(&*state.store)?))
}

/// GET /api/presales/months
pub async fn presales_months(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let bids = store::load_bids(&*state.store)?;
    let displays: Vec<String> = bids.iter().map(|b| month_display(&b.month)).collect();
    Ok(Json(distinct_months(displays.iter().map(String::as_str))))
}

#[derive(Debug, Deserialize)]
pub struct PresalesCompareRequest {
    pub months: Vec<String>,
    pub metric: BidMetric,
}

/// POST /api/presales/compare
pub async fn presales_compare(
    State(state): State<AppState>,
    Json(req): Json<PresalesCompareRequest>,
) -> Result<impl IntoResponse> {
    validate_month_selection(&req.months)?;

    let bids = store::load_bids(&*state.store)?;
    let rows = compare_bid_months(&bids, &req.months, req.metric)
        .into_iter()
        .collect();

    Ok(Json(CompareResponse {
        months: req.months,
        decrease_is_good: false,
        rows,
    }))
}

/// GET /api/presales/bids/export?format=csv|xlsx
pub async fn presales_bids_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse> {
    let bids = store::load_bids(&*state.store)?;
    let export = exporters::bids_table(&bids);
    download(&export, "Bids Data", "Bids_Overview", &query.format)
}
