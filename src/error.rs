//! Error handling for the application

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Per-field validation messages, keyed by the submitted field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Top-level message for any response carrying field errors.
pub const CORRECT_FIELDS: &str = "Please correct the highlighted fields.";

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    RateLimited(&'static str),

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure with per-field messages.
    pub fn fields(field_errors: FieldErrors) -> Self {
        AppError::Validation {
            message: CORRECT_FIELDS.to_string(),
            field_errors,
        }
    }
}

/// JSON body returned for every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: FieldErrors,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, field_errors) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string(), FieldErrors::new()),
            AppError::RateLimited(message) => {
                (StatusCode::TOO_MANY_REQUESTS, message.to_string(), FieldErrors::new())
            }
            AppError::Validation {
                message,
                field_errors,
            } => (StatusCode::UNPROCESSABLE_ENTITY, message, field_errors),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), FieldErrors::new())
            }
            AppError::Conflict(message) => (StatusCode::CONFLICT, message, FieldErrors::new()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "We hit a snag. Please try again shortly.".to_string(),
                    FieldErrors::new(),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Template error".to_string(),
                    FieldErrors::new(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                    FieldErrors::new(),
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            field_errors,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
