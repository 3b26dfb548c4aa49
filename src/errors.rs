// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Prediction not found for match {0}")]
    PredictionNotFound(u64),

    #[error("Match not found: {0}")]
    MatchNotFound(u64),

    #[error("Match {0} has already kicked off")]
    MatchStarted(u64),

    #[error("Match {0} has no final result yet")]
    ResultNotAvailable(u64),

    #[error("Duplicate key error")]
    DuplicateKey,

    #[error("Authentication error")]
    AuthError,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing endpoint parameter")]
    MissingEndpoint,

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Service error: {0}")]
    ServiceError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string()),
            AppError::PredictionNotFound(_) => (StatusCode::NOT_FOUND, "Prediction not found".to_string()),
            AppError::MatchNotFound(_) => (StatusCode::NOT_FOUND, "Match not found".to_string()),
            AppError::MatchStarted(_) => (StatusCode::CONFLICT, "Match already started".to_string()),
            AppError::ResultNotAvailable(_) => (StatusCode::CONFLICT, "Result not available".to_string()),
            AppError::DuplicateKey => (StatusCode::CONFLICT, "Duplicate entry".to_string()),
            AppError::AuthError => (StatusCode::UNAUTHORIZED, "Authentication failed".to_string()),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
            AppError::MissingEndpoint => (StatusCode::BAD_REQUEST, "Missing endpoint parameter".to_string()),
            AppError::ExternalApi(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch data from football API".to_string(),
            ),
            AppError::ConfigurationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string()),
            AppError::ServiceError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string()),
        };

        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        }

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

// Manual From implementations
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ValidationError(format!("JSON parsing error: {}", err))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("JWT rejected: {}", err);
        AppError::AuthError
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::ServiceError(format!("Password hashing failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn external_api(msg: impl Into<String>) -> Self {
        AppError::ExternalApi(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::Storage(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
