//! Per-request departure data, built from the transit response and dropped after rendering.

use crate::time_format::{minutes_until, seconds_to_clock, LocalClock};
use crate::urgency::{classify, UrgencyTier};

/// Arrival of the same trip at a configured downstream stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamArrival {
    pub label: String,
    /// Seconds since midnight.
    pub arrival: i64,
}

/// One departure from the kiosk's stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRecord {
    /// Seconds since midnight.
    pub scheduled_departure: i64,
    pub realtime_departure: Option<i64>,
    pub is_realtime: bool,
    pub route_short_name: Option<String>,
    pub downstream: Vec<DownstreamArrival>,
}

impl DepartureRecord {
    pub fn scheduled(scheduled_departure: i64) -> Self {
        Self {
            scheduled_departure,
            realtime_departure: None,
            is_realtime: false,
            route_short_name: None,
            downstream: Vec::new(),
        }
    }

    /// Realtime value when live data is flagged and present, otherwise scheduled.
    pub fn effective_departure(&self) -> i64 {
        match (self.is_realtime, self.realtime_departure) {
            (true, Some(realtime)) => realtime,
            _ => self.scheduled_departure,
        }
    }

    pub fn clock(&self) -> String {
        seconds_to_clock(self.effective_departure())
    }

    pub fn minutes_until(&self, now: LocalClock) -> i64 {
        minutes_until(self.effective_departure(), now)
    }

    pub fn urgency(&self, now: LocalClock) -> UrgencyTier {
        classify(self.minutes_until(now))
    }
}

/// Everything the transit API told us about the stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopBoard {
    /// `None` when the response had no stop at all.
    pub station_name: Option<String>,
    pub departures: Vec<DepartureRecord>,
}

impl StopBoard {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }
}
