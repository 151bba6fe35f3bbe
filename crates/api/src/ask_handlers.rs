//! Ask-AI and trend-analysis endpoints. The store side only serializes the
//! right record slice; the model owns the language work and is treated as
//! fails-open free text.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use ai_client::{OllamaClient, OllamaClientConfig};
use dashboard_engine::csd;

use crate::error::{ApiError, Result};
use crate::state::AppState;

const AI_FAILURE_MESSAGE: &str = "An error occurred during AI analysis. Please try again.";

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// POST /api/presales/ask
pub async fn ask_about_bids(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse> {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("Question is required.".to_string()));
    }

    let bids = store::load_bids(&*state.store)?;
    if bids.is_empty() {
        return Err(ApiError::BadRequest("Bids data is required.".to_string()));
    }
    let payload = serde_json::to_string(&bids)
        .map_err(|err| ApiError::from(anyhow::Error::from(err)))?;

    let answer = {
        let question = question.clone();
        run_ai(state.ai.clone(), move |client| {
            client.ask_about_bids(&question, &payload)
        })
        .await?
    };

    Ok(Json(json!({
        "success": true,
        "message": "Analysis complete.",
        "question": question,
        "answer": answer,
    })))
}

/// POST /api/csd/ask
pub async fn ask_about_csd(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse> {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("Question is required.".to_string()));
    }

    let calls = store::load_calls(&*state.store)?;
    let inventory = store::load_inventory(&*state.store)?;
    if calls.is_empty() {
        return Err(ApiError::BadRequest("Calls data is required.".to_string()));
    }
    if inventory.is_empty() {
        return Err(ApiError::BadRequest("Inventory data is required.".to_string()));
    }

    let calls_payload = serde_json::to_string(&calls)
        .map_err(|err| ApiError::from(anyhow::Error::from(err)))?;
    let inventory_payload = serde_json::to_string(&inventory)
        .map_err(|err| ApiError::from(anyhow::Error::from(err)))?;

    let answer = {
        let question = question.clone();
        run_ai(state.ai.clone(), move |client| {
            client.ask_about_csd(&question, &calls_payload, &inventory_payload)
        })
        .await?
    };

    Ok(Json(json!({
        "success": true,
        "message": "Analysis complete.",
        "question": question,
        "answer": answer,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub month: String,
    pub service_center: String,
}

/// POST /api/csd/analyze
/// Trend analysis for one (month, service center) slice.
pub async fn analyze_service_center(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse> {
    if req.month.trim().is_empty() {
        return Err(ApiError::BadRequest("Month is required.".to_string()));
    }
    if req.service_center.trim().is_empty() {
        return Err(ApiError::BadRequest("Service Center is required.".to_string()));
    }

    let calls = store::load_calls(&*state.store)?;
    let inventory = store::load_inventory(&*state.store)?;
    let summaries = csd::center_month_summaries(&calls, &inventory, &req.month, &req.service_center);

    let Some(calls_summary) = summaries.calls else {
        return Err(ApiError::BadRequest(
            "No calls data found for the selected month and service center.".to_string(),
        ));
    };
    let inventory_summary = summaries.inventory.unwrap_or_default();

    let analysis = run_ai(state.ai.clone(), move |client| {
        client.analyze_service_center(
            &req.month,
            &req.service_center,
            &calls_summary,
            &inventory_summary,
        )
    })
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Analysis complete.",
        "data": analysis,
    })))
}

/// Runs a blocking AI call off the async runtime. Any failure is logged and
/// surfaced as the generic AI-failure message.
async fn run_ai<T, F>(config: OllamaClientConfig, call: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&OllamaClient) -> anyhow::Result<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let client = OllamaClient::new(config)?;
        call(&client)
    })
    .await
    .map_err(|err| {
        tracing::error!(error = ?err, "AI task panicked");
        ApiError::InternalError(AI_FAILURE_MESSAGE.to_string())
    })?;

    result.map_err(|err| {
        tracing::error!(error = ?err, "AI analysis failed");
        ApiError::InternalError(AI_FAILURE_MESSAGE.to_string())
    })
}
