//! CSD (service & inventory) endpoints plus the health check.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

use dashboard_engine::trends::{ComparisonRow, CsdMetric, compare_csd_months};
use dashboard_engine::{csd, distinct_months, latest_month, month_display};
use models::{CallRecord, InventoryRecord};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct CsdSummary {
    pub total_service_centers: Option<csd::ServiceCenterCount>,
    pub active_service_centers: Option<csd::ActiveCenters>,
    pub total_calls: Option<csd::CallTotals>,
    pub cancelled_calls: Option<csd::CancelledCalls>,
    pub inventory_value: Option<csd::InventoryValue>,
}

/// GET /api/csd/summary
/// KPI card values for the latest imported month.
pub async fn csd_summary(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let calls = store::load_calls(&*state.store)?;
    let inventory = store::load_inventory(&*state.store)?;

    Ok(Json(CsdSummary {
        total_service_centers: csd::total_service_centers(&calls),
        active_service_centers: csd::active_service_centers(&calls),
        total_calls: csd::total_calls(&calls),
        cancelled_calls: csd::cancelled_calls(&calls),
        inventory_value: csd::inventory_value(&inventory),
    }))
}

/// GET /api/csd/call-performance
pub async fn csd_call_performance(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let calls = store::load_calls(&*state.store)?;
    Ok(Json(csd::call_performance(&calls)))
}

/// GET /api/csd/status-breakdown
pub async fn csd_status_breakdown(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let calls = store::load_calls(&*state.store)?;
    Ok(Json(csd::status_breakdown(&calls)))
}

/// GET /api/csd/risk-breakdown
pub async fn csd_risk_breakdown(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let calls = store::load_calls(&*state.store)?;
    Ok(Json(csd::risk_breakdown(&calls)))
}

#[derive(Debug, Serialize)]
pub struct MonthTable<T> {
    pub month: Option<String>,
    pub records: Vec<T>,
}

/// GET /api/csd/calls
/// The calls table: latest-month rows, raw values preserved.
pub async fn csd_calls(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let calls = store::load_calls(&*state.store)?;
    Ok(Json(latest_month_table(calls, |c: &CallRecord| &c.month)))
}

/// GET /api/csd/inventory
pub async fn csd_inventory(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let inventory = store::load_inventory(&*state.store)?;
    Ok(Json(latest_month_table(inventory, |i: &InventoryRecord| {
        &i.month
    })))
}

/// GET /api/csd/months
/// Distinct months for the comparison pickers.
pub async fn csd_months(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let calls = store::load_calls(&*state.store)?;
    Ok(Json(distinct_months(calls.iter().map(|c| c.month.as_str()))))
}

#[derive(Debug, Deserialize)]
pub struct CsdCompareRequest {
    pub months: Vec<String>,
    #[serde(default)]
    pub centers: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    pub metric: CsdMetric,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub months: Vec<String>,
    pub decrease_is_good: bool,
    pub rows: Vec<ComparisonRow>,
}

/// POST /api/csd/compare
/// Month-wise trend comparison across service centers. Months are compared
/// in the order they were selected.
pub async fn csd_compare(
    State(state): State<AppState>,
    Json(req): Json<CsdCompareRequest>,
) -> Result<impl IntoResponse> {
    validate_month_selection(&req.months)?;

    let calls = store::load_calls(&*state.store)?;
    let inventory = store::load_inventory(&*state.store)?;
    let rows = compare_csd_months(
        &calls,
        &inventory,
        &req.months,
        &req.centers,
        &req.statuses,
        req.metric,
    );

    Ok(Json(CompareResponse {
        months: req.months,
        decrease_is_good: req.metric.decrease_is_good(),
        rows,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: String,
}

/// GET /api/csd/calls/export?format=csv|xlsx
pub async fn csd_calls_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse> {
    let table = latest_month_table(store::load_calls(&*state.store)?, |c: &CallRecord| &c.month);
    let month = table.month.unwrap_or_else(|| "N-A".to_string());
    let export = exporters::calls_table(&table.records);
    download(&export, "Calls Data", &format!("Calls_Overview_{month}"), &query.format)
}

/// GET /api/csd/inventory/export?format=csv|xlsx
pub async fn csd_inventory_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse> {
    let table = latest_month_table(store::load_inventory(&*state.store)?, |i: &InventoryRecord| {
        &i.month
    });
    let month = table.month.unwrap_or_else(|| "N-A".to_string());
    let export = exporters::inventory_table(&table.records);
    download(
        &export,
        "Inventory Data",
        &format!("Inventory_Overview_{month}"),
        &query.format,
    )
}

pub(crate) fn validate_month_selection(months: &[String]) -> Result<()> {
    if !(2..=3).contains(&months.len()) {
        return Err(ApiError::BadRequest(
            "Select two or three months to compare.".to_string(),
        ));
    }
    for (i, month) in months.iter().enumerate() {
        if months[..i].contains(month) {
            return Err(ApiError::BadRequest(
                "Selected months must be distinct.".to_string(),
            ));
        }
    }
    Ok(())
}

fn latest_month_table<T, F>(records: Vec<T>, month_of: F) -> MonthTable<T>
where
    F: Fn(&T) -> &String,
{
    let month = latest_month(records.iter().map(|r| month_of(r).as_str()));
    let records = match &month {
        Some(m) => records
            .into_iter()
            .filter(|r| month_display(month_of(r)) == *m)
            .collect(),
        None => records,
    };
    MonthTable { month, records }
}

pub(crate) fn download(
    export: &exporters::TableExport,
    sheet_name: &str,
    file_stem: &str,
    format: &str,
) -> Result<axum::response::Response> {
    match format {
        "csv" => {
            let body = exporters::to_csv(export)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv;charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{file_stem}.csv\""),
                    ),
                ],
                body,
            )
                .into_response())
        }
        "xlsx" => {
            let body = exporters::to_xlsx(export, sheet_name)?;
            Ok((
                [
                    (
                        header::CONTENT_TYPE,
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                            .to_string(),
                    ),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{file_stem}.xlsx\""),
                    ),
                ],
                body,
            )
                .into_response())
        }
        other => Err(ApiError::BadRequest(format!(
            "Unsupported export format '{other}' (use csv or xlsx)."
        ))),
    }
}
