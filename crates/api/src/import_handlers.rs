//! Workbook upload endpoint.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use serde_json::json;

use ingest::ImportTarget;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// POST /api/import
///
/// Multipart form with a `file` part (the workbook) and an optional
/// `sheetName` part; `sheetName=Bids` routes the upload to the pre-sales
/// dataset, anything else to the CSD pair.
pub async fn import_data(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut file_name = String::new();
    let mut bytes: Option<Vec<u8>> = None;
    let mut sheet_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid upload form.".to_string()))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("Could not read the uploaded file.".to_string()))?;
                bytes = Some(data.to_vec());
            }
            Some("sheetName") => {
                sheet_name = field.text().await.ok();
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| ApiError::BadRequest("File is required.".to_string()))?;
    let target = ImportTarget::from_sheet_name(sheet_name.as_deref());

    let summary = ingest::import_bytes(&*state.store, &file_name, &bytes, target)?;
    tracing::info!(
        file = %file_name,
        target = ?target,
        "workbook imported"
    );

    Ok(Json(json!({
        "success": true,
        "message": summary.message,
        "imported": summary.imported,
    })))
}
