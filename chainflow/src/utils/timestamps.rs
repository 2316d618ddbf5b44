//! Timestamp helpers used in lifecycle events.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// Format: `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`
///
/// # Examples
///
/// ```
/// use chainflow::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Converts a duration to fractional milliseconds.
#[must_use]
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
