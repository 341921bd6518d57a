use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// A single failed row from an override patch batch.
///
/// Patches are applied independently; rows that did apply are not rolled
/// back, so every failure must be reported back to the caller by id.
#[derive(Debug, Clone, Serialize)]
pub struct PatchFailure {
    pub id: uuid::Uuid,
    pub cause: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] validator::ValidationErrors),

    #[error("Validation error: {0}")]
    Validation(anyhow::Error),

    #[error("Authentication error: {0}")]
    Authentication(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Configuration error: {0}")]
    Configuration(anyhow::Error),

    #[error("Persistence error: {0}")]
    Persistence(anyhow::Error),

    #[error("{} override patch(es) failed", failures.len())]
    PartialUpdate { failures: Vec<PatchFailure> },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(anyhow::Error::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Persistence(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details) = match self {
            AppError::InvalidRequest(err) => (
                StatusCode::BAD_REQUEST,
                "Invalid request".to_string(),
                Some(err.to_string()),
            ),
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::Authentication(err) => (StatusCode::UNAUTHORIZED, err.to_string(), None),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None),
            AppError::Configuration(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
            AppError::Persistence(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Persistence error".to_string(),
                Some(err.to_string()),
            ),
            AppError::PartialUpdate { failures } => {
                let listing = failures
                    .iter()
                    .map(|f| format!("- tx {}: {}", f.id, f.cause))
                    .collect::<Vec<_>>()
                    .join("\n");
                (
                    StatusCode::CONFLICT,
                    "Failed to update some transactions".to_string(),
                    Some(listing),
                )
            }
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}
