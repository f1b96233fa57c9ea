// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage.

use sqlx::FromRow;

/// Registered account stored in the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Unique login name (primary key)
    pub username: String,
    /// Argon2 PHC string; plaintext is never stored
    pub password_hash: String,
}
