//! Timestamp and copyright-year codecs.
//!
//! GPX carries timestamps as RFC 3339 text; the geometry mapping carries them
//! as a scalar measure value (seconds since the Unix epoch, fractions
//! preserved). Both directions live here, together with the lenient
//! copyright-year parser.

use chrono::{DateTime, Timelike, Utc};

use crate::error::{GpxError, Result};

/// Converts a UTC timestamp to its measure value: seconds since the Unix
/// epoch as a double, sub-second fractions preserved (500 ms becomes `.5`).
pub fn time_to_m(t: DateTime<Utc>) -> f64 {
    t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1e9
}

/// Inverse of [`time_to_m`]: reconstructs whole seconds and nanosecond
/// fraction from the measure value, normalized to UTC.
///
/// Rounding of the fraction can carry into the seconds field. Measure values
/// beyond chrono's representable range collapse to the epoch.
pub fn m_to_time(m: f64) -> DateTime<Utc> {
    let secs = m.floor();
    let mut sec = secs as i64;
    let mut nanos = ((m - secs) * 1e9).round() as i64;
    if nanos >= 1_000_000_000 {
        sec += 1;
        nanos = 0;
    }
    DateTime::from_timestamp(sec, nanos as u32).unwrap_or_default()
}

/// Parses an RFC 3339 timestamp. Offset forms are accepted and normalized to
/// UTC; anything else is an `InvalidTimestamp` error.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| GpxError::InvalidTimestamp(s.to_string()))
}

/// Formats a timestamp in the canonical GPX form: `YYYY-MM-DDTHH:MM:SSZ`,
/// with a fractional-second suffix (trailing zeros trimmed) only when the
/// value carries one.
pub fn format_time(t: DateTime<Utc>) -> String {
    let nanos = t.nanosecond();
    if nanos == 0 {
        t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        let frac = format!("{nanos:09}");
        format!(
            "{}.{}Z",
            t.format("%Y-%m-%dT%H:%M:%S"),
            frac.trim_end_matches('0')
        )
    }
}

/// Parses a copyright year permissively: the leading run of ASCII digits is
/// the year and trailing noise (a stray `Z`, a `+05:00` offset) is ignored.
/// Fails only when no leading digit run exists.
pub fn parse_year(s: &str) -> Result<i32> {
    let s = s.trim();
    let digits = &s[..s.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return Err(GpxError::InvalidYear(s.to_string()));
    }
    digits
        .parse()
        .map_err(|_| GpxError::InvalidYear(s.to_string()))
}
