//! Instant helpers: elapsed time, slot midpoints, and boundary parsing.
//!
//! All instants inside the engine are `DateTime<Utc>`. Strings cross the
//! boundary through [parse_instant], which accepts any explicit UTC offset
//! (including `Z`) and normalizes to UTC; naive timestamps are rejected so
//! they can never be compared against UTC-aware ones.

use std::error::Error;
use std::fmt;

use chrono::{DateTime, Utc};

/// Absolute elapsed time between two instants, in fractional minutes.
/// Direction does not matter.
pub fn elapsed_minutes(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (a - b).num_seconds().abs() as f64 / 60.0
}

/// Midpoint of a half-open `[start, end)` interval.
pub fn slot_midpoint(start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    start + (end - start) / 2
}

/// A timestamp string that could not be converted to a UTC instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantParseError {
    pub input: String,
    pub reason: String,
}

impl fmt::Display for InstantParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid instant {:?}: {}", self.input, self.reason)
    }
}

impl Error for InstantParseError {}

/// Parse an RFC 3339 timestamp carrying an explicit offset into a UTC instant.
///
/// `2026-03-02T13:00:00Z` and `2026-03-02T15:00:00+02:00` both normalize to
/// the same instant. Naive timestamps (no offset) fail.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, InstantParseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| InstantParseError {
            input: s.to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn elapsed_minutes_is_absolute() {
        let a = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        let b = a + Duration::minutes(45);
        assert_eq!(elapsed_minutes(a, b), 45.0);
        assert_eq!(elapsed_minutes(b, a), 45.0);
        assert_eq!(elapsed_minutes(a, a), 0.0);
    }

    #[test]
    fn midpoint_splits_the_window() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        let end = start + Duration::minutes(60);
        assert_eq!(slot_midpoint(start, end), start + Duration::minutes(30));
    }

    #[test]
    fn parse_instant_normalizes_offsets_to_utc() {
        let zulu = parse_instant("2026-03-02T13:00:00Z").expect("zulu");
        let offset = parse_instant("2026-03-02T15:00:00+02:00").expect("offset");
        assert_eq!(zulu, offset);
        assert_eq!(zulu, Utc.with_ymd_and_hms(2026, 3, 2, 13, 0, 0).unwrap());
    }

    #[test]
    fn parse_instant_rejects_naive_timestamps() {
        let err = parse_instant("2026-03-02T13:00:00").expect_err("naive must fail");
        assert_eq!(err.input, "2026-03-02T13:00:00");
    }
}
