// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! On-demand catalog sync.

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::SyncReport;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

/// Sync routes. Login gating is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/sync", get(run_sync))
}

/// Run a sync now and report what changed, including the new total.
///
/// Blocks until the fetch and all inserts finish; concurrent requests
/// queue behind the running sync.
async fn run_sync(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<AuthUser>>,
) -> Result<Json<SyncReport>> {
    let requested_by = user.map(|Extension(user)| user.username);
    tracing::info!(requested_by = ?requested_by, "Sync requested");
    let report = state.sync.run().await?;
    Ok(Json(report))
}
