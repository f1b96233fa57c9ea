// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::credentials::CredentialError;
use crate::services::sessions::SessionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Login required")]
    Unauthorized,

    #[error("Car API error: {0}")]
    CarApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl AppError {
    /// Status code and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Credentials(_) => (StatusCode::BAD_REQUEST, "invalid_credentials"),
            AppError::Session(_) => (StatusCode::BAD_REQUEST, "session_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::CarApi(_) => (StatusCode::BAD_GATEWAY, "car_api_error"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_code();

        let message = match &self {
            AppError::Credentials(err) => err.to_string(),
            AppError::Session(err) => err.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Unauthorized => "You must be logged in".to_string(),
            AppError::CarApi(msg) => {
                tracing::warn!(error = %msg, "Car API error");
                format!("Sync failed: {}", msg)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "Database error".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
