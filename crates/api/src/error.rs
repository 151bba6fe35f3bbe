use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use ingest::ImportError;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("{0}")]
    InternalError(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Full detail stays in the server log; the caller gets a generic
        // retry prompt.
        tracing::error!(error = ?err, "internal error");
        ApiError::InternalError("An internal error occurred. Please try again.".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            ApiError::Import(import_err) => match import_err {
                ImportError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
                ImportError::SheetNotFound(_) => {
                    (StatusCode::BAD_REQUEST, import_err.to_string())
                }
                ImportError::Write(source) => {
                    tracing::error!(error = ?source, "bulk write failed during import");
                    (StatusCode::INTERNAL_SERVER_ERROR, import_err.to_string())
                }
            },
            ApiError::InternalError(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_not_found_surfaces_sheet_name() {
        let err = ApiError::Import(ImportError::SheetNotFound("Inventory".to_string()));
        assert_eq!(
            err.to_string(),
            "Sheet 'Inventory' not found in the Excel file."
        );
    }

    #[test]
    fn test_write_failure_surfaces_generic_message() {
        let err = ApiError::Import(ImportError::Write(anyhow::anyhow!("disk unplugged")));
        let message = err.to_string();
        assert!(!message.contains("disk unplugged"));
        assert!(message.contains("Please try again"));
    }
}
