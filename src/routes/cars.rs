// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Car catalog query routes.

use crate::error::{AppError, Result};
use crate::models::CarRecord;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/car/{model}/{year}", get(find_cars))
}

/// Cars matching a model and year.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CarSearchResponse {
    pub result: Vec<CarRecord>,
}

/// Exact, case-sensitive match on both model and year.
async fn find_cars(
    State(state): State<Arc<AppState>>,
    Path((model, year)): Path<(String, String)>,
) -> Result<Json<CarSearchResponse>> {
    let year: i64 = year
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Year must be an integer, got {:?}", year)))?;

    let result = state.db.find_cars(&model, year).await?;
    tracing::debug!(model = %model, year, count = result.len(), "Car search");

    Ok(Json(CarSearchResponse { result }))
}
