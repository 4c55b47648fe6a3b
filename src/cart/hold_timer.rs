use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

/// Below this many seconds the countdown is shown as urgent
pub const URGENT_THRESHOLD_SECS: u64 = 120;

/// Snapshot of the cart hold countdown
///
/// Purely informational; an expired hold does not release any seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HoldStatus {
    pub remaining_seconds: u64,
    /// Remaining time as MM:SS
    #[schema(example = "09:59")]
    pub display: String,
    pub urgent: bool,
    pub expired: bool,
    pub started_at: DateTime<Utc>,
}

/// Countdown over a fixed hold window
#[derive(Debug, Clone, Copy)]
pub struct HoldTimer {
    window: Duration,
}

impl HoldTimer {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Status of a hold that began at `started_at`, evaluated at `now`
    pub fn status(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> HoldStatus {
        let elapsed = (now - started_at).num_seconds().max(0) as u64;
        let remaining = self.window.as_secs().saturating_sub(elapsed);

        HoldStatus {
            remaining_seconds: remaining,
            display: format_countdown(remaining),
            urgent: remaining < URGENT_THRESHOLD_SECS,
            expired: remaining == 0,
            started_at,
        }
    }
}

pub fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> HoldTimer {
        HoldTimer::new(Duration::from_secs(600))
    }

    #[test]
    fn test_fresh_hold() {
        let start = Utc::now();
        let status = timer().status(start, start);
        assert_eq!(status.remaining_seconds, 600);
        assert_eq!(status.display, "10:00");
        assert!(!status.urgent);
        assert!(!status.expired);
    }

    #[test]
    fn test_urgent_below_two_minutes() {
        let start = Utc::now();
        let status = timer().status(start, start + chrono::Duration::seconds(481));
        assert_eq!(status.remaining_seconds, 119);
        assert_eq!(status.display, "01:59");
        assert!(status.urgent);

        let status = timer().status(start, start + chrono::Duration::seconds(480));
        assert!(!status.urgent);
    }

    #[test]
    fn test_expired_hold_saturates_at_zero() {
        let start = Utc::now();
        let status = timer().status(start, start + chrono::Duration::seconds(3600));
        assert_eq!(status.remaining_seconds, 0);
        assert_eq!(status.display, "00:00");
        assert!(status.expired);
    }

    #[test]
    fn test_clock_skew_does_not_extend_hold() {
        let start = Utc::now();
        let status = timer().status(start, start - chrono::Duration::seconds(30));
        assert_eq!(status.remaining_seconds, 600);
    }
}
