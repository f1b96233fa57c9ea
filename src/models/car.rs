// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Car catalog record.

use serde::Serialize;
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One car model/year entry, copied verbatim from the upstream catalog.
///
/// Records are only ever inserted by sync; an existing `object_id` is never
/// refreshed even if upstream data changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CarRecord {
    /// Upstream identifier (primary key)
    pub object_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub year: i64,
    pub make: String,
    pub model: String,
    pub category: String,
    /// Upstream creation timestamp, kept as the original string
    pub created_at: String,
    /// Upstream update timestamp, kept as the original string
    pub updated_at: String,
}

impl CarRecord {
    /// Whole years between the model year and `current_year`.
    ///
    /// Negative for model years in the future; `None` if the difference
    /// does not fit in an `i64`.
    pub fn age_in_years(&self, current_year: i64) -> Option<i64> {
        current_year.checked_sub(self.year)
    }
}
