// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use car_catalog::error::AppError;
use car_catalog::services::{CredentialError, SessionError};

#[test]
fn test_client_errors_are_bad_request() {
    let errors = [
        AppError::from(CredentialError::UsernameTaken),
        AppError::from(SessionError::NotLoggedIn),
        AppError::from(SessionError::AlreadyLoggedIn("Testing123".to_string())),
        AppError::BadRequest("nope".to_string()),
    ];

    for err in errors {
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST, "{}", err);
    }
}

#[test]
fn test_server_side_status_codes() {
    assert_eq!(
        AppError::CarApi("timeout".to_string()).status_and_code(),
        (StatusCode::BAD_GATEWAY, "car_api_error")
    );
    assert_eq!(
        AppError::Unauthorized.status_and_code(),
        (StatusCode::UNAUTHORIZED, "unauthorized")
    );
    assert_eq!(
        AppError::Database("locked".to_string())
            .into_response()
            .status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_database_detail_is_not_leaked() {
    let response = AppError::Database("no such table: users".to_string()).into_response();
    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"], "database_error");
    assert_eq!(body["message"], "Database error");
}
