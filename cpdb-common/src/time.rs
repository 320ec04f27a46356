//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as ISO-8601 with microsecond precision and a
/// `+00:00` offset (the form stored in the catalog).
pub fn to_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Unix-epoch seconds rounded to the nearest second (the form stored in
/// the catalog; plain `timestamp()` truncates toward zero).
pub fn to_unix(dt: DateTime<Utc>) -> i64 {
    (dt.timestamp_millis() + 500).div_euclid(1000)
}
