// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and logout routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::session::{removal_cookie, session_cookie, session_id};
use crate::routes::MessageResponse;
use crate::services::SessionError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
}

/// Body of register and login requests.
///
/// Fields are loosely typed so a missing or non-string one yields a specific
/// message rather than a generic deserialization error.
#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    #[serde(default)]
    username: Option<Value>,
    #[serde(default)]
    password: Option<Value>,
}

/// The string in `field`, or a 400 naming it as required.
fn required_string(field: Option<Value>, name: &str) -> Result<String> {
    match field {
        Some(Value::String(s)) => Ok(s),
        _ => Err(AppError::BadRequest(format!("{} is required", name))),
    }
}

impl CredentialsBody {
    fn into_parts(self) -> Result<(String, String)> {
        let username = required_string(self.username, "Username")?;
        let password = required_string(self.password, "Password")?;
        Ok((username, password))
    }
}

/// Unwrap a JSON body, reporting parse failures as 400.
fn json_body(payload: std::result::Result<Json<CredentialsBody>, JsonRejection>) -> Result<(String, String)> {
    let Json(body) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    body.into_parts()
}

/// Response for a successful registration.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegisterResponse {
    pub username: String,
}

/// Create an account.
async fn register(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let (username, password) = json_body(payload)?;

    let user = state.auth.register(&username, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            username: user.username,
        }),
    ))
}

/// Log in and set a freshly issued session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: std::result::Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    let (username, password) = json_body(payload)?;
    let session = state
        .auth
        .login(session_id(&jar).as_deref(), &username, &password)
        .await?;

    let jar = jar.add(session_cookie(session, state.config.cookie_secure));
    Ok((
        jar,
        Json(MessageResponse {
            message: format!("{} logged in successfully", username),
        }),
    ))
}

/// Log out of this client's session.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    let session = session_id(&jar).ok_or(SessionError::NotLoggedIn)?;
    let username = state.auth.logout(&session)?;

    let jar = jar.remove(removal_cookie(state.config.cookie_secure));
    Ok((
        jar,
        Json(MessageResponse {
            message: format!("{} logged out successfully", username),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(username: Option<&str>, password: Option<&str>) -> CredentialsBody {
        CredentialsBody {
            username: username.map(Value::from),
            password: password.map(Value::from),
        }
    }

    #[test]
    fn test_into_parts_requires_both_fields() {
        let err = body(None, Some("testing123")).into_parts().unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: Username is required");

        let err = body(Some("Testing123"), None).into_parts().unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: Password is required");

        let (u, p) = body(Some("Testing123"), Some("testing123")).into_parts().unwrap();
        assert_eq!((u.as_str(), p.as_str()), ("Testing123", "testing123"));
    }

    #[test]
    fn test_into_parts_rejects_non_string_fields() {
        let numeric = CredentialsBody {
            username: Some(Value::from(12345678)),
            password: Some(Value::from("testing123")),
        };
        let err = numeric.into_parts().unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: Username is required");

        let null_password = CredentialsBody {
            username: Some(Value::from("Testing123")),
            password: Some(Value::Null),
        };
        let err = null_password.into_parts().unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: Password is required");
    }
}
