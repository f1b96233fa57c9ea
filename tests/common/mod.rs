// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use car_catalog::config::Config;
use car_catalog::db::Database;
use car_catalog::error::AppError;
use car_catalog::routes::create_router;
use car_catalog::services::{CarSource, MemorySessionStore};
use car_catalog::AppState;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Upstream stand-in serving a fixed, replaceable collection.
#[derive(Default)]
pub struct StaticSource {
    entries: Mutex<Vec<Value>>,
    fail: Mutex<bool>,
}

#[allow(dead_code)]
impl StaticSource {
    pub fn set_entries(&self, entries: Vec<Value>) {
        *self.entries.lock().unwrap() = entries;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl CarSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<Value>, AppError> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::CarApi("HTTP 503 Service Unavailable: down".to_string()));
        }
        Ok(self.entries.lock().unwrap().clone())
    }
}

/// One upstream entry in the wire format.
#[allow(dead_code)]
pub fn car_entry(object_id: &str, make: &str, model: &str, year: i64) -> Value {
    json!({
        "objectId": object_id,
        "Year": year,
        "Make": make,
        "Model": model,
        "Category": "Sedan",
        "createdAt": "2020-01-27T20:44:17.665Z",
        "updatedAt": "2020-01-27T20:44:17.665Z"
    })
}

/// Test app backed by an in-memory database and a static upstream.
#[allow(dead_code)]
pub async fn create_test_app_with_config(
    config: Config,
) -> (Router, Arc<AppState>, Arc<StaticSource>) {
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to open in-memory database");
    let source = Arc::new(StaticSource::default());
    let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(
        config.session_ttl_secs,
    )));

    let state = Arc::new(AppState::new(config, db, source.clone(), sessions));
    (create_router(state.clone()), state, source)
}

#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>, Arc<StaticSource>) {
    create_test_app_with_config(Config::test_default()).await
}

/// Send a request, optionally with a JSON body and a session cookie.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` pair of the session cookie set by a response.
#[allow(dead_code)]
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("car_catalog_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Register then log in; returns the session cookie.
#[allow(dead_code)]
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let credentials = json!({ "username": username, "password": password });

    let response = send(app, "POST", "/auth/register", Some(credentials.clone()), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(app, "POST", "/auth/login", Some(credentials), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).expect("login should set a session cookie")
}
