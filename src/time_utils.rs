// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{Datelike, Utc};

/// Current calendar year (UTC) from the system clock.
pub fn current_year() -> i64 {
    i64::from(Utc::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_year_is_plausible() {
        let year = current_year();
        assert!(year >= 2024, "clock reports {}", year);
    }
}
