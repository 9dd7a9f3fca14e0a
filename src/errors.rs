use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::ContactField;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("unable to parse a date from \"{query}\"")]
    DateParseFailure { query: String },

    #[error("{message}")]
    Validation { field: ContactField, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no booking in progress")]
    NoBookingInProgress,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to persist appointment: {0}")]
    Persistence(String),
}

impl AppError {
    pub fn validation(field: ContactField, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::OracleUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::DateParseFailure { .. } => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NoBookingInProgress => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Validation { field, .. } => serde_json::json!({
                "error": self.to_string(),
                "field": field.as_str(),
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
