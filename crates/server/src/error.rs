use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bonnetje_core::{SheetError, ValidationError};
use bonnetje_ocr::{OcrError, PipelineError};
use serde::Serialize;

/// Error response body: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Item {row}: {source}")]
    Validation {
        row: usize,
        #[source]
        source: ValidationError,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        };
        let message = match &self {
            ApiError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };
        let body = ErrorBody { error: ErrorDetail { code, message } };
        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// Map an edit failure on the item at `index` (0-based) of a request.
    pub fn from_sheet(index: usize, e: SheetError) -> Self {
        match e {
            SheetError::Validation(source) => ApiError::Validation { row: index + 1, source },
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<bonnetje_storage::StorageError> for ApiError {
    fn from(e: bonnetje_storage::StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<bonnetje_export::ExportError> for ApiError {
    fn from(e: bonnetje_export::ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("background task failed: {e}"))
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Preprocess(e) => ApiError::BadRequest(format!("Unreadable image: {e}")),
            PipelineError::Ocr(OcrError::NotAvailable) => {
                ApiError::Unavailable(OcrError::NotAvailable.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
