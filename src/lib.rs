// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Car Catalog: user accounts plus a locally mirrored car model catalog
//!
//! This crate provides the backend API for registering and logging in users,
//! syncing car records from an upstream REST collection, and querying them.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{Argon2Hasher, AuthService, CarSource, SessionStore, SyncService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub auth: AuthService,
    pub sync: SyncService,
}

impl AppState {
    /// Wire services over a connected database.
    pub fn new(
        config: Config,
        db: Database,
        source: Arc<dyn CarSource>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let auth = AuthService::new(db.clone(), Arc::new(Argon2Hasher), sessions);
        let sync = SyncService::new(db.clone(), source);
        Self {
            config,
            db,
            auth,
            sync,
        }
    }
}
