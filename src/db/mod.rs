// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite).

pub mod sqlite;

pub use sqlite::{Database, InsertOutcome};

/// Table names as constants.
pub mod tables {
    pub const USERS: &str = "users";
    pub const CARS: &str = "cars";
}
