// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::str::FromStr;

/// Default upstream collection (Parse-style REST API).
pub const DEFAULT_CAR_API_URL: &str = "https://parseapi.back4app.com/classes/Car_Model_List";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Server port
    pub port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,

    // --- Upstream car catalog ---
    /// Collection endpoint of the car API
    pub car_api_url: String,
    /// Sent as `X-Parse-Application-Id` when set
    pub car_api_app_id: Option<String>,
    /// Sent as `X-Parse-REST-API-Key` when set
    pub car_api_key: Option<String>,
    /// Entries requested per page
    pub car_api_page_size: u32,
    /// Hard cap on pages fetched in one sync run
    pub car_api_max_pages: u32,
    /// Timeout for each upstream request
    pub car_api_timeout_secs: u64,

    // --- Sync ---
    /// Interval between background syncs; 0 disables the scheduler
    pub sync_interval_secs: u64,
    /// Whether `GET /sync` needs a logged-in session
    pub sync_requires_login: bool,

    // --- Sessions ---
    /// Idle lifetime of a session entry
    pub session_ttl_secs: u64,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl Config {
    /// Config for tests: in-memory database, scheduler disabled.
    pub fn test_default() -> Self {
        Self {
            port: 8000,
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            car_api_url: "http://127.0.0.1:9/classes/Car_Model_List".to_string(),
            car_api_app_id: None,
            car_api_key: None,
            car_api_page_size: 100,
            car_api_max_pages: 10,
            car_api_timeout_secs: 5,
            sync_interval_secs: 0,
            sync_requires_login: true,
            session_ttl_secs: 3600,
            cookie_secure: false,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_or("PORT", 8000)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://cars.db?mode=rwc".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            car_api_url: env::var("CAR_API_URL")
                .unwrap_or_else(|_| DEFAULT_CAR_API_URL.to_string()),
            car_api_app_id: optional("CAR_API_APP_ID"),
            car_api_key: optional("CAR_API_KEY"),
            car_api_page_size: parse_or("CAR_API_PAGE_SIZE", 100)?,
            car_api_max_pages: parse_or("CAR_API_MAX_PAGES", 100)?,
            car_api_timeout_secs: parse_or("CAR_API_TIMEOUT_SECS", 30)?,

            sync_interval_secs: parse_or("SYNC_INTERVAL_SECS", 24 * 60 * 60)?,
            sync_requires_login: parse_or("SYNC_REQUIRES_LOGIN", true)?,

            session_ttl_secs: parse_or("SESSION_TTL_SECS", 24 * 60 * 60)?,
            cookie_secure: parse_or("COOKIE_SECURE", false)?,
        })
    }
}

/// Read a variable, treating empty or whitespace-only values as unset.
fn optional(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name, raw)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
