//! Urgency tiers: how hurried a departure should look on the board.

use serde::Serialize;

/// Visual urgency of a departure, by minutes left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    /// Under 4 minutes, including departed trains. Not worth running for.
    Grey,
    /// 4 or 5 minutes.
    Red,
    /// 6 to 8 minutes.
    Yellow,
    /// 9 minutes or more.
    Green,
}

impl UrgencyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyTier::Grey => "grey",
            UrgencyTier::Red => "red",
            UrgencyTier::Yellow => "yellow",
            UrgencyTier::Green => "green",
        }
    }
}

/// Exclusive upper bounds, checked in order; first match wins.
const TIER_BOUNDS: &[(i64, UrgencyTier)] = &[
    (4, UrgencyTier::Grey),
    (6, UrgencyTier::Red),
    (9, UrgencyTier::Yellow),
];

/// Maps minutes until departure to a tier. Total over all integers.
pub fn classify(minutes_until: i64) -> UrgencyTier {
    TIER_BOUNDS
        .iter()
        .find(|(bound, _)| minutes_until < *bound)
        .map(|(_, tier)| *tier)
        .unwrap_or(UrgencyTier::Green)
}
