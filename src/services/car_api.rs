// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the upstream car catalog (Parse-style REST collection).
//!
//! Handles:
//! - Paged listing via `limit`/`skip`
//! - Optional Parse application/API key headers
//! - Request timeouts and non-2xx status mapping

use crate::config::Config;
use crate::error::AppError;
use crate::models::CarRecord;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Anything that can produce the full upstream collection.
///
/// Entries are returned undecoded so one malformed entry cannot fail the
/// whole batch; see [`RemoteCar::from_value`].
#[async_trait]
pub trait CarSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Value>, AppError>;
}

/// One entry as served by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteCar {
    #[serde(rename = "objectId")]
    pub object_id: String,
    #[serde(rename = "Year")]
    pub year: i64,
    #[serde(rename = "Make")]
    pub make: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl RemoteCar {
    /// Decode a raw upstream entry.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl From<RemoteCar> for CarRecord {
    fn from(remote: RemoteCar) -> Self {
        CarRecord {
            object_id: remote.object_id,
            year: remote.year,
            make: remote.make,
            model: remote.model,
            category: remote.category,
            created_at: remote.created_at,
            updated_at: remote.updated_at,
        }
    }
}

/// Page envelope returned by Parse collection endpoints.
#[derive(Debug, Deserialize)]
struct ResultsPage {
    results: Vec<Value>,
}

/// Car catalog API client.
#[derive(Clone)]
pub struct CarApiClient {
    http: reqwest::Client,
    base_url: String,
    app_id: Option<String>,
    api_key: Option<String>,
    page_size: u32,
    max_pages: u32,
}

impl CarApiClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.car_api_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.car_api_url.clone(),
            app_id: config.car_api_app_id.clone(),
            api_key: config.car_api_key.clone(),
            page_size: config.car_api_page_size.max(1),
            max_pages: config.car_api_max_pages.max(1),
        })
    }

    /// Fetch one page starting at offset `skip`.
    pub async fn list_page(&self, skip: u32) -> Result<Vec<Value>, AppError> {
        let mut request = self.http.get(&self.base_url).query(&[
            ("limit", self.page_size.to_string()),
            ("skip", skip.to_string()),
            // Stable ordering so offsets do not shift between pages.
            ("order", "objectId".to_string()),
        ]);

        if let Some(app_id) = &self.app_id {
            request = request.header("X-Parse-Application-Id", app_id);
        }
        if let Some(api_key) = &self.api_key {
            request = request.header("X-Parse-REST-API-Key", api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::CarApi("Request timed out".to_string())
            } else {
                AppError::CarApi(e.to_string())
            }
        })?;

        let page: ResultsPage = self.check_response_json(response).await?;
        Ok(page.results)
    }

    /// Check response status and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Car API rate limit hit (429)");
            }

            return Err(AppError::CarApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::CarApi(format!("JSON parse error: {}", e)))
    }
}

/// Offset of the first entry on `page`, or `None` past the `u32` range.
fn page_offset(page: u32, page_size: u32) -> Option<u32> {
    page.checked_mul(page_size)
}

#[async_trait]
impl CarSource for CarApiClient {
    async fn fetch_all(&self) -> Result<Vec<Value>, AppError> {
        let mut entries = Vec::new();

        for page in 0..self.max_pages {
            let Some(skip) = page_offset(page, self.page_size) else {
                tracing::warn!(
                    page,
                    page_size = self.page_size,
                    fetched = entries.len(),
                    "Page offset out of range, stopping"
                );
                return Ok(entries);
            };
            let batch = self.list_page(skip).await?;
            let batch_len = batch.len();
            entries.extend(batch);

            if batch_len < self.page_size as usize {
                return Ok(entries);
            }
        }

        tracing::warn!(
            max_pages = self.max_pages,
            fetched = entries.len(),
            "Stopped paging at page limit"
        );
        Ok(entries)
    }
}
