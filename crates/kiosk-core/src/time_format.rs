//! Clock strings and minutes-until-departure from seconds-since-midnight values.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Wall-clock hour and minute at the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    pub hours: u32,
    pub minutes: u32,
}

impl LocalClock {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    /// Current time in the station's zone, not the server's.
    pub fn now_in(tz: Tz) -> Self {
        Self::at(&Utc::now(), tz)
    }

    pub fn at<Z: TimeZone>(instant: &DateTime<Z>, tz: Tz) -> Self {
        let local = instant.with_timezone(&tz);
        Self::new(local.hour(), local.minute())
    }

    fn minutes_since_midnight(&self) -> i64 {
        i64::from(self.hours) * 60 + i64::from(self.minutes)
    }
}

/// `HH:MM` for a seconds-since-midnight value. Truncates, never rounds.
///
/// Service days run past midnight, so values of a day or more come out as
/// `24:10`, `25:00` and so on.
pub fn seconds_to_clock(seconds: i64) -> String {
    format!("{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60)
}

/// Whole minutes from `now` until the departure. Negative once it has left.
pub fn minutes_until(effective_departure_seconds: i64, now: LocalClock) -> i64 {
    effective_departure_seconds.div_euclid(60) - now.minutes_since_midnight()
}
