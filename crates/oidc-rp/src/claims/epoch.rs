//! Conversions between instants and floating epoch seconds.
//!
//! All claim time arithmetic happens in `f64` seconds since the Unix epoch so
//! that fractional NumericDate values and sub-second leeways are compared
//! without truncation.

use std::time::Duration;

use time::{OffsetDateTime, PrimitiveDateTime};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Seconds since the Unix epoch, with sub-second precision.
pub(crate) fn to_seconds(instant: OffsetDateTime) -> f64 {
    instant.unix_timestamp() as f64 + f64::from(instant.nanosecond()) / NANOS_PER_SECOND
}

/// Converts epoch seconds back to an instant, or `None` when out of range.
pub(crate) fn from_seconds(seconds: f64) -> Option<OffsetDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * NANOS_PER_SECOND).round() as i64;
    OffsetDateTime::from_unix_timestamp(whole as i64)
        .ok()?
        .checked_add(time::Duration::nanoseconds(nanos))
}

/// Like [`from_seconds`], clamping to the representable range.
pub(crate) fn saturating_from_seconds(seconds: f64) -> OffsetDateTime {
    from_seconds(seconds).unwrap_or_else(|| {
        if seconds.is_sign_negative() {
            PrimitiveDateTime::MIN.assume_utc()
        } else {
            PrimitiveDateTime::MAX.assume_utc()
        }
    })
}

/// Adds durations to an epoch-seconds value.
pub(crate) fn add(seconds: f64, durations: &[Duration]) -> f64 {
    durations
        .iter()
        .fold(seconds, |acc, d| acc + d.as_secs_f64())
}
