//! Time-related utilities.

use chrono::{TimeZone, Utc};

/// Get current Unix timestamp in UTC (milliseconds)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to RFC 3339 format in UTC
///
/// Out-of-range timestamps are rendered as the raw millisecond value.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.to_rfc3339(),
        None => timestamp_millis.to_string(),
    }
}
