use chrono::{DateTime, TimeZone, Utc};

/// Parses a vendor string field into an i64, falling back to 0 on any
/// parse failure. Vendor fields are sometimes legitimately empty, so a
/// failure is never surfaced to the caller.
pub fn to_i64(value: &str) -> i64 {
    value.parse().unwrap_or(0)
}

/// Parses a vendor string field into a bool, falling back to false on any
/// parse failure. Accepts the same spellings Apple has been observed to
/// send ("1"/"0", "true"/"false" in any common casing).
pub fn to_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "true" | "TRUE" | "True")
}

/// Parses a vendor epoch-milliseconds string into a UTC timestamp
/// truncated to whole seconds. The sub-second precision is intentionally
/// discarded; the vendor's display fields only carry second precision
/// anyway. A missing, malformed, or zero value yields `None`, the sentinel
/// "no such date", which orders before every real timestamp.
pub fn to_timestamp(millis: &str) -> Option<DateTime<Utc>> {
    let ms: i64 = millis.parse().ok()?;
    if ms == 0 {
        return None;
    }
    Utc.timestamp_opt(ms / 1000, 0).single()
}
