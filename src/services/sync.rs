// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Car catalog synchronization.
//!
//! A run fetches the whole upstream collection and inserts entries that are
//! recent enough and not stored yet. Stored records are never refreshed.
//! Individual insert failures are logged and skipped; there is no rollback.

use crate::db::{Database, InsertOutcome};
use crate::error::AppError;
use crate::models::CarRecord;
use crate::services::car_api::{CarSource, RemoteCar};
use crate::time_utils::current_year;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Entries older than this many years (relative to the current year) are skipped.
pub const MAX_AGE_YEARS: i64 = 10;

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncReport {
    /// Entries returned by the upstream API
    pub fetched: usize,
    /// New records written
    pub inserted: usize,
    /// Entries older than [`MAX_AGE_YEARS`]
    pub skipped_stale: usize,
    /// Entries whose `objectId` was already stored (or repeated in the batch)
    pub skipped_existing: usize,
    /// Entries that could not be decoded
    pub skipped_invalid: usize,
    /// Inserts that failed with a storage error
    pub failed: usize,
    /// Records in the store after the run
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total: i64,
}

/// Records selected for insertion plus skip counters.
#[derive(Debug, Default)]
pub struct SyncPlan {
    pub to_insert: Vec<CarRecord>,
    pub skipped_stale: usize,
    pub skipped_existing: usize,
    pub skipped_invalid: usize,
}

/// Decide which fetched entries to insert.
///
/// `existing` is the set of stored `objectId`s, loaded once per run. An id
/// repeated within `entries` is planned only once.
pub fn plan_sync(entries: Vec<Value>, existing: &HashSet<String>, current_year: i64) -> SyncPlan {
    let mut plan = SyncPlan::default();
    let mut planned: HashSet<String> = HashSet::new();

    for value in entries {
        let remote = match RemoteCar::from_value(value) {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed car entry");
                plan.skipped_invalid += 1;
                continue;
            }
        };

        let car: CarRecord = remote.into();

        // An age that overflows is treated as too old.
        let stale = car
            .age_in_years(current_year)
            .map_or(true, |age| age > MAX_AGE_YEARS);
        if stale {
            plan.skipped_stale += 1;
            continue;
        }

        if existing.contains(&car.object_id) || !planned.insert(car.object_id.clone()) {
            plan.skipped_existing += 1;
            continue;
        }

        plan.to_insert.push(car);
    }

    plan
}

/// Runs syncs against the database, one at a time.
#[derive(Clone)]
pub struct SyncService {
    db: Database,
    source: Arc<dyn CarSource>,
    /// Serializes runs so two syncs never plan against the same snapshot.
    run_lock: Arc<Mutex<()>>,
}

impl SyncService {
    pub fn new(db: Database, source: Arc<dyn CarSource>) -> Self {
        Self {
            db,
            source,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run a sync using the current year from the system clock.
    pub async fn run(&self) -> Result<SyncReport, AppError> {
        self.run_for_year(current_year()).await
    }

    /// Run a sync treating `current_year` as "now" for the age filter.
    pub async fn run_for_year(&self, current_year: i64) -> Result<SyncReport, AppError> {
        let _guard = self.run_lock.lock().await;

        let entries = self.source.fetch_all().await?;
        let fetched = entries.len();
        tracing::info!(fetched, current_year, "Fetched car catalog");

        let existing = self.db.car_object_ids().await?;
        let plan = plan_sync(entries, &existing, current_year);

        let mut report = SyncReport {
            fetched,
            skipped_stale: plan.skipped_stale,
            skipped_existing: plan.skipped_existing,
            skipped_invalid: plan.skipped_invalid,
            ..SyncReport::default()
        };

        for car in &plan.to_insert {
            match self.db.insert_car(car).await {
                Ok(InsertOutcome::Inserted) => report.inserted += 1,
                Ok(InsertOutcome::Duplicate) => report.skipped_existing += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        object_id = %car.object_id,
                        "Failed to insert car, skipping"
                    );
                    report.failed += 1;
                }
            }
        }

        report.total = self.db.count_cars().await?;

        tracing::info!(
            fetched = report.fetched,
            inserted = report.inserted,
            skipped_stale = report.skipped_stale,
            skipped_existing = report.skipped_existing,
            skipped_invalid = report.skipped_invalid,
            failed = report.failed,
            total = report.total,
            "Sync complete"
        );

        Ok(report)
    }

    /// Spawn a background task that syncs immediately and then every `interval`.
    ///
    /// Abort the returned handle to stop it. A failed run is logged and the
    /// next tick tries again.
    pub fn spawn_scheduler(&self, interval: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            // `interval` panics on a zero period.
            let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = service.run().await {
                    tracing::error!(error = %e, "Scheduled sync failed");
                }
            }
        })
    }
}
