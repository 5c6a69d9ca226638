//! Daily active time window for warming traffic.
//!
//! The platform operates in a single fixed-offset timezone. Warming sends
//! are allowed only while the local hour is within `[8, 22)`; outside that
//! window the dispatch cycle is a no-op.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

use crate::error::CoreError;

/// First local hour (inclusive) during which warming sends are allowed.
pub const ACTIVE_START_HOUR: u32 = 8;

/// Local hour (exclusive) at which warming sends stop.
pub const ACTIVE_END_HOUR: u32 = 22;

/// Default operating timezone as a whole-hour UTC offset.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -3;

/// Validate a configured UTC offset. Real-world offsets span UTC-12..UTC+14.
pub fn validate_utc_offset(offset_hours: i32) -> Result<(), CoreError> {
    if (-12..=14).contains(&offset_hours) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "UTC offset must be between -12 and +14 hours, got {offset_hours}"
        )))
    }
}

/// Shift a UTC instant into the operating timezone.
fn to_local(now_utc: DateTime<Utc>, offset_hours: i32) -> DateTime<Utc> {
    now_utc + Duration::hours(offset_hours as i64)
}

/// The calendar date of `now_utc` in the operating timezone.
///
/// Daily targets and rollover are keyed on this date, not on the UTC date.
pub fn local_date(now_utc: DateTime<Utc>, offset_hours: i32) -> NaiveDate {
    to_local(now_utc, offset_hours).date_naive()
}

/// Number of whole local calendar days between two UTC instants.
///
/// Used by the rollover job to advance `current_day` even if the job was
/// down for more than one day.
pub fn elapsed_local_days(
    earlier_utc: DateTime<Utc>,
    later_utc: DateTime<Utc>,
    offset_hours: i32,
) -> i64 {
    let earlier = local_date(earlier_utc, offset_hours);
    let later = local_date(later_utc, offset_hours);
    (later.num_days_from_ce() - earlier.num_days_from_ce()) as i64
}

/// Whether the instant falls inside the daily active window.
///
/// Inclusive at [`ACTIVE_START_HOUR`], exclusive at [`ACTIVE_END_HOUR`]:
/// 08:00 local is active, 22:00 local is not.
pub fn is_within_active_hours(now_utc: DateTime<Utc>, offset_hours: i32) -> bool {
    let hour = to_local(now_utc, offset_hours).hour();
    (ACTIVE_START_HOUR..ACTIVE_END_HOUR).contains(&hour)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Build a UTC instant at the given local wall-clock time for `offset`.
    fn utc_at_local(offset: i32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0)
            .single()
            .map(|local_as_utc| local_as_utc - Duration::hours(offset as i64))
            .unwrap()
    }

    #[test]
    fn eight_am_local_is_active() {
        assert!(is_within_active_hours(utc_at_local(-3, 8, 0), -3));
    }

    #[test]
    fn just_before_ten_pm_local_is_active() {
        assert!(is_within_active_hours(utc_at_local(-3, 21, 59), -3));
    }

    #[test]
    fn just_before_eight_am_local_is_inactive() {
        assert!(!is_within_active_hours(utc_at_local(-3, 7, 59), -3));
    }

    #[test]
    fn ten_pm_local_is_inactive() {
        assert!(!is_within_active_hours(utc_at_local(-3, 22, 0), -3));
    }

    #[test]
    fn window_respects_positive_offsets_too() {
        assert!(is_within_active_hours(utc_at_local(5, 12, 0), 5));
        assert!(!is_within_active_hours(utc_at_local(5, 3, 0), 5));
    }

    #[test]
    fn local_date_shifts_across_midnight() {
        // 01:30 UTC on March 10 is still March 9 at UTC-3.
        let instant = Utc.with_ymd_and_hms(2026, 3, 10, 1, 30, 0).unwrap();
        assert_eq!(
            local_date(instant, -3),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
        );
        assert_eq!(
            local_date(instant, 0),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );
    }

    #[test]
    fn elapsed_days_counts_local_midnights() {
        let a = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 3, 13, 12, 0, 0).unwrap();
        assert_eq!(elapsed_local_days(a, b, -3), 3);
        assert_eq!(elapsed_local_days(a, a, -3), 0);
    }

    #[test]
    fn offset_validation_bounds() {
        assert!(validate_utc_offset(-12).is_ok());
        assert!(validate_utc_offset(14).is_ok());
        assert!(validate_utc_offset(0).is_ok());
        assert!(validate_utc_offset(-13).is_err());
        assert!(validate_utc_offset(15).is_err());
    }
}
