//! Metro kiosk core library.
//! Fetches departures and the daily quote, turns stoptimes into clock strings and
//! urgency tiers, and renders them into the dashboard template.

pub mod config;
pub mod departure;
pub mod error;
pub mod quote;
pub mod render;
pub mod time_format;
pub mod transit;
pub mod urgency;

pub use config::{DownstreamStop, KioskConfig};
pub use departure::{DepartureRecord, DownstreamArrival, StopBoard};
pub use error::{ConfigError, RenderError, UpstreamError};
pub use quote::{Quote, QuoteClient};
pub use render::{DashboardRenderer, QUOTE_CONTAINER_ID, TIMETABLE_CONTAINER_ID};
pub use time_format::{minutes_until, seconds_to_clock, LocalClock};
pub use transit::TransitClient;
pub use urgency::{classify, UrgencyTier};

pub use chrono_tz::Tz;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
