//! Time utilities for the sentinel
//!
//! Distraction and cooldown timing use monotonic time so that wall-clock
//! adjustments never shorten or extend a grace period. Wall-clock time is
//! only used for log and report timestamps.

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Represents a point in monotonic time for distraction and cooldown timing.
/// This is immune to wall-clock changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Duration since `earlier`, or zero if `earlier` is later than `self`
    pub fn duration_since(&self, earlier: MonotonicInstant) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicInstant(self.0 + rhs)
    }
}

/// Current local wall-clock time (reports and logs only)
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Convert fractional seconds from configuration into a `Duration`.
///
/// Returns `None` for negative, NaN or overflowing values.
pub fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}

/// Format a short countdown with one decimal place, e.g. `2.1s`
pub fn format_countdown(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_instant() {
        let t1 = MonotonicInstant::now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = MonotonicInstant::now();

        assert!(t2 > t1);
        assert!(t2.duration_since(t1) >= Duration::from_millis(10));
    }

    #[test]
    fn test_duration_since_saturates() {
        let base = MonotonicInstant::now();
        let later = base + Duration::from_secs(5);

        assert_eq!(base.duration_since(later), Duration::ZERO);
        assert_eq!(later.duration_since(base), Duration::from_secs(5));
    }

    #[test]
    fn test_seconds_to_duration() {
        assert_eq!(seconds_to_duration(3.0), Some(Duration::from_secs(3)));
        assert_eq!(seconds_to_duration(0.5), Some(Duration::from_millis(500)));
        assert_eq!(seconds_to_duration(-1.0), None);
        assert_eq!(seconds_to_duration(f64::NAN), None);
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::from_millis(2100)), "2.1s");
        assert_eq!(format_countdown(Duration::from_secs(3)), "3.0s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
    }
}
