// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (registration and credential lookup)
//! - Cars (sync inserts and catalog queries)
//!
//! Uniqueness is enforced by primary keys; callers may pre-check, but the
//! insert result is authoritative.

use crate::db::tables;
use crate::error::AppError;
use crate::models::{CarRecord, User};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashSet;
use std::str::FromStr;

/// Outcome of an insert against a primary-keyed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same key already exists; nothing was written.
    Duplicate,
}

/// SQLite database client.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and create the schema if it does not exist yet.
    ///
    /// In-memory URLs get a single pinned connection, since every SQLite
    /// connection would otherwise see its own empty database.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::info!(url = database_url, "Connected to SQLite");
        Ok(db)
    }

    /// Create tables and indexes. Safe to run on every startup.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        let statements = [
            format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    username TEXT PRIMARY KEY NOT NULL,
                    password_hash TEXT NOT NULL
                )",
                tables::USERS
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    object_id TEXT PRIMARY KEY NOT NULL,
                    year INTEGER NOT NULL,
                    make TEXT NOT NULL,
                    model TEXT NOT NULL,
                    category TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )",
                tables::CARS
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS idx_cars_model_year ON {} (model, year)",
                tables::CARS
            ),
        ];

        for statement in &statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by username.
    pub async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT username, password_hash FROM {} WHERE username = ?",
            tables::USERS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a new user. Returns `Duplicate` if the username is taken.
    pub async fn insert_user(&self, user: &User) -> Result<InsertOutcome, AppError> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (username, password_hash) VALUES (?, ?)",
            tables::USERS
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await;

        classify_insert(result)
    }

    /// Raw pool, for tests that need to tamper with the schema.
    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ─── Car Operations ──────────────────────────────────────────

    /// All `object_id`s currently stored, loaded in one scan.
    pub async fn car_object_ids(&self) -> Result<HashSet<String>, AppError> {
        let ids: Vec<String> =
            sqlx::query_scalar(&format!("SELECT object_id FROM {}", tables::CARS))
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    /// Insert a car record. Returns `Duplicate` if the `object_id` exists.
    pub async fn insert_car(&self, car: &CarRecord) -> Result<InsertOutcome, AppError> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (object_id, year, make, model, category, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            tables::CARS
        ))
        .bind(&car.object_id)
        .bind(car.year)
        .bind(&car.make)
        .bind(&car.model)
        .bind(&car.category)
        .bind(&car.created_at)
        .bind(&car.updated_at)
        .execute(&self.pool)
        .await;

        classify_insert(result)
    }

    /// Total number of stored car records.
    pub async fn count_cars(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", tables::CARS))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Cars matching `model` and `year` exactly (case-sensitive).
    pub async fn find_cars(&self, model: &str, year: i64) -> Result<Vec<CarRecord>, AppError> {
        let cars = sqlx::query_as::<_, CarRecord>(&format!(
            "SELECT object_id, year, make, model, category, created_at, updated_at
             FROM {} WHERE model = ? AND year = ?
             ORDER BY make, object_id",
            tables::CARS
        ))
        .bind(model)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(cars)
    }
}

/// Map a unique-constraint violation to `Duplicate`; other errors propagate.
fn classify_insert(
    result: Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error>,
) -> Result<InsertOutcome, AppError> {
    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Ok(InsertOutcome::Duplicate)
        }
        Err(err) => Err(err.into()),
    }
}
