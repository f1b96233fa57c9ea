// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod car_api;
pub mod credentials;
pub mod sessions;
pub mod sync;

pub use auth::AuthService;
pub use car_api::{CarApiClient, CarSource, RemoteCar};
pub use credentials::{Argon2Hasher, CredentialError, CredentialHasher};
pub use sessions::{MemorySessionStore, SessionError, SessionStore};
pub use sync::{SyncReport, SyncService};
