use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error surfaced to HTTP callers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Image too large: {0}")]
    PayloadTooLarge(String),

    /// The generation provider failed, refused or timed out
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable identifier clients can branch on
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::PayloadTooLarge(_) => "image_too_large",
            Self::ExternalService(_) => "generation_failed",
            Self::Database(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// Storage errors are logged in full but reported without driver detail
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            Self::Database(_) => "Internal server error: storage unavailable".to_string(),
            other => other.to_string(),
        };

        ErrorResponse {
            code: self.code().to_string(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(self.to_response())).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
