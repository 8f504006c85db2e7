//! Weekly business-hour windows gating which slots are visible.

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// One recurring weekly window: a set of ISO weekdays (1 = Mon .. 7 = Sun)
/// and an inclusive local time-of-day range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub days_of_week: Vec<u8>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl AvailabilityWindow {
    /// True when the instant's weekday is in the day set and its time of day
    /// falls within `[start_time, end_time]`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.weekday().number_from_monday() as u8;
        if !self.days_of_week.contains(&day) {
            return false;
        }
        let t = at.time();
        t >= self.start_time && t <= self.end_time
    }
}

/// The configured set of windows. A slot is visible only if its start falls
/// inside at least one window; with no windows configured nothing is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Resource)]
pub struct AvailabilityConfig {
    pub windows: Vec<AvailabilityWindow>,
}

impl AvailabilityConfig {
    /// Open every day, all day.
    pub fn always() -> Self {
        Self {
            windows: vec![AvailabilityWindow {
                days_of_week: (1..=7).collect(),
                start_time: NaiveTime::from_hms_opt(0, 0, 0).expect("midnight is valid"),
                end_time: NaiveTime::from_hms_opt(23, 59, 59).expect("end of day is valid"),
            }],
        }
    }

    /// Monday through Friday, 13:00–17:00.
    pub fn weekday_afternoons() -> Self {
        Self {
            windows: vec![AvailabilityWindow {
                days_of_week: (1..=5).collect(),
                start_time: NaiveTime::from_hms_opt(13, 0, 0).expect("13:00 is valid"),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).expect("17:00 is valid"),
            }],
        }
    }

    pub fn allows(&self, start_at: DateTime<Utc>) -> bool {
        self.windows.iter().any(|w| w.contains(start_at))
    }
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self::always()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 2026-03-02 is a Monday.
    fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let cfg = AvailabilityConfig::weekday_afternoons();
        assert!(cfg.allows(monday_at(13, 0)));
        assert!(cfg.allows(monday_at(17, 0)));
        assert!(cfg.allows(monday_at(15, 30)));
        assert!(!cfg.allows(monday_at(12, 59)));
        assert!(!cfg.allows(monday_at(17, 1)));
    }

    #[test]
    fn day_set_excludes_weekends() {
        let cfg = AvailabilityConfig::weekday_afternoons();
        // 2026-03-07 is a Saturday.
        let saturday = Utc.with_ymd_and_hms(2026, 3, 7, 14, 0, 0).unwrap();
        assert!(!cfg.allows(saturday));
    }

    #[test]
    fn no_windows_means_nothing_is_visible() {
        let cfg = AvailabilityConfig { windows: vec![] };
        assert!(!cfg.allows(monday_at(14, 0)));
    }

    #[test]
    fn always_covers_the_whole_week() {
        let cfg = AvailabilityConfig::always();
        for day in 0..7 {
            let at = monday_at(3, 17) + chrono::Duration::days(day);
            assert!(cfg.allows(at));
        }
    }

    #[test]
    fn windows_roundtrip_through_json() {
        let cfg = AvailabilityConfig::weekday_afternoons();
        let json = serde_json::to_string(&cfg).expect("serialize");
        assert!(json.contains("daysOfWeek"));
        let back: AvailabilityConfig = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, cfg);
    }
}
