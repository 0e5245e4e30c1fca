use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Parse an ISO-8601 timestamp as written in session logs.
///
/// Accepts RFC 3339 (`2024-02-12T09:30:00Z`, `+02:00` offsets) and naive
/// date-times, which are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Convert a file modification time into fractional epoch seconds
pub fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Current time as fractional epoch seconds
pub fn now_epoch_seconds() -> f64 {
    epoch_seconds(SystemTime::now())
}

/// UTC stamp used in report file names (`20240212_093000`)
pub fn file_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Truncate a string to a maximum number of characters
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
