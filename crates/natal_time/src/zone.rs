//! Timezone normalization for civil timestamps.
//!
//! Every timestamp entering the engine must carry an explicit zone: either
//! an RFC 3339 offset in the text itself or a separate zone designator.
//! Accepted designators are `UTC`, `Z`, `GMT`, `±HH:MM`, `±HHMM`, `±HH`
//! and `UTC±HH[:MM]` / `GMT±HH[:MM]`. Region names (e.g. `Europe/Paris`)
//! are rejected because resolving them needs a tz database.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};

use crate::error::TimeError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a fixed UTC offset designator.
pub fn parse_offset(tz: &str) -> Result<FixedOffset, TimeError> {
    let unknown = || TimeError::UnknownTimezone(tz.to_string());
    let s = tz.trim();
    if s.is_empty() {
        return Err(TimeError::MissingTimezone(tz.to_string()));
    }
    if ["UTC", "Z", "GMT", "UT"].iter().any(|n| n.eq_ignore_ascii_case(s)) {
        return FixedOffset::east_opt(0).ok_or_else(unknown);
    }

    let body = ["UTC", "GMT"]
        .iter()
        .find_map(|p| {
            s.get(..p.len())
                .filter(|head| head.eq_ignore_ascii_case(p))
                .map(|_| &s[p.len()..])
        })
        .unwrap_or(s);

    let (sign, digits) = match body.as_bytes().first() {
        Some(b'+') => (1, &body[1..]),
        Some(b'-') => (-1, &body[1..]),
        _ => return Err(unknown()),
    };

    if !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return Err(unknown());
    }
    let (hh, mm) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    let is_field = |f: &str| !f.is_empty() && f.len() <= 2 && f.bytes().all(|b| b.is_ascii_digit());
    if !(is_field(hh) && is_field(mm)) {
        return Err(unknown());
    }
    let hours: i32 = hh.parse().map_err(|_| unknown())?;
    let minutes: i32 = mm.parse().map_err(|_| unknown())?;
    if hours > 14 || minutes >= 60 {
        return Err(unknown());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(unknown)
}

/// Interpret a local wall-clock reading in the given zone and convert to UTC.
pub fn localize(naive: NaiveDateTime, tz: &str) -> Result<DateTime<Utc>, TimeError> {
    let offset = parse_offset(tz)?;
    match offset.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        _ => Err(TimeError::InvalidDateTime(format!("{naive} in {tz}"))),
    }
}

/// Parse an RFC 3339 timestamp that carries its own offset.
///
/// A timestamp without an offset fails with [`TimeError::MissingTimezone`]
/// rather than being read as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimeError> {
    let s = s.trim();
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(e) => {
            if parse_naive(s).is_some() {
                Err(TimeError::MissingTimezone(s.to_string()))
            } else {
                Err(TimeError::InvalidDateTime(format!("{s}: {e}")))
            }
        }
    }
}

/// Parse a timestamp, using `tz` when the text has no offset of its own.
///
/// When both are present the embedded offset wins only if `tz` agrees with it.
pub fn parse_with_zone(s: &str, tz: Option<&str>) -> Result<DateTime<Utc>, TimeError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        if let Some(tz) = tz {
            let zone = parse_offset(tz)?;
            if zone != *dt.offset() {
                return Err(TimeError::InvalidDateTime(format!(
                    "{s} conflicts with zone {tz}"
                )));
            }
        }
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = parse_naive(s).ok_or_else(|| TimeError::InvalidDateTime(s.to_string()))?;
    match tz {
        Some(tz) => localize(naive, tz),
        None => Err(TimeError::MissingTimezone(s.to_string())),
    }
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}
