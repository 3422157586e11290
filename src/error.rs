//! Error types for Aristosys.
//!
//! Uses thiserror for ergonomic error definitions that integrate
//! with axum's response system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth errors
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    SignupRejected(String),

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    InvalidInput(String),

    // File errors
    #[error("File too large: max {max_size} bytes")]
    FileTooLarge { max_size: usize },

    #[error("Failed to extract PDF text: {0}")]
    DocumentExtraction(String),

    // External service errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not configured")]
    NotConfigured(String),

    #[error("LLM error: {0}")]
    Llm(#[from] aristosys_llm::Error),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 401
            Self::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,

            // 404
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            // 400
            Self::SignupRejected(_)
            | Self::Validation(_)
            | Self::InvalidInput(_)
            | Self::DocumentExtraction(_) => StatusCode::BAD_REQUEST,

            // 413
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 502
            Self::Llm(_) | Self::Transcription(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,

            // 500
            Self::Database(_) | Self::NotConfigured(_) | Self::Internal(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            Self::SignupRejected(_) => "SIGNUP_REJECTED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::DocumentExtraction(_) => "DOCUMENT_EXTRACTION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::NotConfigured(_) => "NOT_CONFIGURED",
            Self::Llm(_) => "LLM_ERROR",
            Self::Transcription(_) => "TRANSCRIPTION_ERROR",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Other(_) => "UNKNOWN_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        } else {
            tracing::debug!(code, error = %message, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(format!("HTTP request failed: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON parsing error: {}", err))
    }
}
