use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum WorkshopError {
    #[error("Unknown store '{0}'")]
    UnknownStore(String),

    #[error("Unknown column '{column}' for store '{store}'")]
    UnknownColumn { store: String, column: String },

    #[error("Unsupported value for column '{column}': arrays and objects cannot be stored")]
    UnsupportedValue { column: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Spreadsheet export is not available in this build")]
    ExportUnavailable,

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WorkshopError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        let (status, code) = match &self {
            WorkshopError::UnknownStore(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_STORE"),
            WorkshopError::UnknownColumn { .. } => (StatusCode::BAD_REQUEST, "UNKNOWN_COLUMN"),
            WorkshopError::UnsupportedValue { .. } => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_VALUE")
            }
            WorkshopError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            WorkshopError::InvalidBody(rejection) => (rejection.status(), "INVALID_BODY"),
            WorkshopError::ExportUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_UNAVAILABLE")
            }
            #[cfg(feature = "xlsx")]
            WorkshopError::Spreadsheet(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED"),
            WorkshopError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
            WorkshopError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::warn!(code, error = %message, "request failed");
        }

        let body = ApiErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
