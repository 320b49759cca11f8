//! Wall-clock time as fractional seconds.
//!
//! The game logic never reads the clock itself; callers pass `now`
//! into every timed operation. This is the one place that does.

use chrono::{DateTime, Utc};

/// Seconds since the Unix epoch, with sub-second precision.
pub type Seconds = f64;

/// Current wall-clock time.
pub fn now_seconds() -> Seconds {
    to_seconds(Utc::now())
}

/// Convert a UTC timestamp into [`Seconds`].
pub fn to_seconds(at: DateTime<Utc>) -> Seconds {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}
