//! Semi-monthly refresh schedule.
//!
//! Accident reports land in batches around the 1st and 15th of each
//! month, so cached data is considered good until the next of those
//! boundaries.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// The next schedule boundary strictly after `now`: the 15th of the
/// current month, or the 1st of the next. All boundaries are UTC
/// midnights.
pub fn next_refresh_after(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = month_start(now.year(), now.month());
    let fifteenth = first + Duration::days(14);
    let next_first = if now.month() == 12 {
        month_start(now.year() + 1, 1)
    } else {
        month_start(now.year(), now.month() + 1)
    };

    if now < first {
        // Clock skew guard
        first
    } else if now < fifteenth {
        fifteenth
    } else {
        next_first
    }
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    // Day 1 exists in every month, so this cannot fail
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
}

// ============================================================================
// Tests
// ============================================================================
