use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::services::ExportError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid upload: {message}")]
    InvalidUpload { message: String },

    #[error("Rate limit exceeded: maximum concurrent requests reached")]
    RateLimitExceeded,

    #[error("No se encontraron registros con montos mayores a 30K.")]
    NoResults,

    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidUpload { .. } => "INVALID_UPLOAD",
            AppError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            AppError::NoResults => "NO_RESULTS",
            AppError::ExportFailed { .. } => "EXPORT_FAILED",
            AppError::Internal { .. } => "INTERNAL_ERROR",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidUpload { .. } => StatusCode::BAD_REQUEST,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::NoResults => StatusCode::NOT_FOUND,
            AppError::ExportFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();
        let request_id = Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().to_rfc3339();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = %status,
                request_id = %request_id,
                error_message = %message,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = %status,
                request_id = %request_id,
                error_message = %message,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
                "request_id": request_id,
                "timestamp": timestamp
            },
            "data": null
        }));

        (status, body).into_response()
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::ExportFailed {
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::internal(format!("Processing task failed: {}", err))
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::InvalidUpload {
            message: format!("Failed to read multipart field: {}", err),
        }
    }
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
