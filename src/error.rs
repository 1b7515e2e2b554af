// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Malformed or out-of-range listing input. Rejected before the store is touched.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// One or more invalid fields in an admin write payload.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures caused by the caller's input (4xx).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::StoreUnavailable(_) | AppError::Internal(_))
    }
}

/// Unreadable request bodies are reported like field errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details, errors) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden".to_string(), Some(msg), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None, None),
            AppError::InvalidFilter(msg) => (StatusCode::BAD_REQUEST, msg, None, None),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_failed".to_string(),
                None,
                Some(errors),
            ),
            AppError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Ride store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_unavailable".to_string(),
                    Some(msg),
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    None,
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error,
            details,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
