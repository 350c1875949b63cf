//! Julian Day representation and calendar conversions.
//!
//! A single `f64` Julian Day resolves about 20 µs near the present epoch,
//! which collapses sub-second differences. [`JulianDay`] keeps the integer
//! day apart from the day fraction so that nanosecond steps in a
//! `DateTime<Utc>` stay distinct and round-trip exactly.
//!
//! Calendar algorithms: Meeus, *Astronomical Algorithms*, 2nd ed., ch. 7.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimeError;

/// Julian Date of the J2000.0 epoch (2000-Jan-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Seconds per Julian day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Days per Julian century.
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

const NANOS_PER_DAY: i64 = 86_400_000_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Julian Day of 1970-01-01T12:00:00 (the noon after the Unix epoch).
const UNIX_NOON_JD: i64 = 2_440_588;

/// A two-part Julian Day: integer day number plus the fraction elapsed since noon.
///
/// Invariant: `fraction ∈ [0, 1)`. Ordering compares `day` first, then `fraction`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct JulianDay {
    day: i64,
    fraction: f64,
}

impl JulianDay {
    /// J2000.0 as a two-part Julian Day.
    pub const J2000: Self = Self {
        day: 2_451_545,
        fraction: 0.0,
    };

    /// Build from a single floating Julian Day.
    pub fn from_f64(jd: f64) -> Result<Self, TimeError> {
        if !jd.is_finite() || jd.abs() > 1.0e9 {
            return Err(TimeError::JulianDayOutOfRange(jd));
        }
        let day = jd.floor();
        Ok(Self::split(day as i64, jd - day))
    }

    fn split(day: i64, fraction: f64) -> Self {
        // floor() of a value just below an integer can leave fraction == 1.0
        if fraction >= 1.0 {
            Self {
                day: day + 1,
                fraction: 0.0,
            }
        } else {
            Self { day, fraction }
        }
    }

    /// Integer day number (the Julian Day at the preceding noon).
    pub fn day(self) -> i64 {
        self.day
    }

    /// Fraction of the day elapsed since the preceding noon, in [0, 1).
    pub fn fraction(self) -> f64 {
        self.fraction
    }

    /// Collapse to a single `f64`.
    pub fn to_f64(self) -> f64 {
        self.day as f64 + self.fraction
    }

    /// Days elapsed since J2000.0, keeping the fraction's precision.
    pub fn days_since_j2000(self) -> f64 {
        (self.day - Self::J2000.day) as f64 + self.fraction
    }

    /// Julian centuries since J2000.0.
    pub fn centuries_since_j2000(self) -> f64 {
        self.days_since_j2000() / DAYS_PER_CENTURY
    }

    /// Shift by a number of seconds.
    pub fn add_seconds(self, seconds: f64) -> Self {
        let shifted = self.fraction + seconds / SECONDS_PER_DAY;
        let whole = shifted.floor();
        Self::split(self.day + whole as i64, shifted - whole)
    }
}

impl std::fmt::Display for JulianDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JD {:.9}", self.to_f64())
    }
}

/// Convert a UTC instant to a Julian Day.
///
/// Exact for 2000-01-01T12:00:00Z (JD 2451545.0) and monotonic in `dt`.
pub fn datetime_to_julian_day(dt: &DateTime<Utc>) -> JulianDay {
    let since_noon = dt.timestamp() - 43_200;
    let day = UNIX_NOON_JD + since_noon.div_euclid(86_400);
    let secs_of_day = since_noon.rem_euclid(86_400);
    let nanos_of_day = secs_of_day * NANOS_PER_SECOND + i64::from(dt.timestamp_subsec_nanos());
    JulianDay {
        day,
        fraction: nanos_of_day as f64 / NANOS_PER_DAY as f64,
    }
}

/// Convert a Julian Day back to a UTC instant, rounded to the nanosecond.
pub fn julian_day_to_datetime(jd: JulianDay) -> Result<DateTime<Utc>, TimeError> {
    if !jd.fraction.is_finite() {
        return Err(TimeError::JulianDayOutOfRange(jd.to_f64()));
    }
    let nanos_of_day = (jd.fraction * NANOS_PER_DAY as f64).round() as i64;
    let carry = nanos_of_day.div_euclid(NANOS_PER_DAY);
    let nanos_of_day = nanos_of_day.rem_euclid(NANOS_PER_DAY);

    let days = (jd.day - UNIX_NOON_JD)
        .checked_add(carry)
        .ok_or(TimeError::JulianDayOutOfRange(jd.to_f64()))?;
    let secs = days
        .checked_mul(86_400)
        .and_then(|s| s.checked_add(43_200 + nanos_of_day / NANOS_PER_SECOND))
        .ok_or(TimeError::JulianDayOutOfRange(jd.to_f64()))?;
    let nanos = (nanos_of_day % NANOS_PER_SECOND) as u32;

    DateTime::<Utc>::from_timestamp(secs, nanos).ok_or(TimeError::JulianDayOutOfRange(jd.to_f64()))
}

/// Convert a UTC instant shifted by `seconds` (for example ΔT) to a Julian Day.
pub fn shifted_julian_day(dt: &DateTime<Utc>, seconds: f64) -> JulianDay {
    let nanos = (seconds * 1.0e9).round() as i64;
    match dt.checked_add_signed(TimeDelta::nanoseconds(nanos)) {
        Some(shifted) => datetime_to_julian_day(&shifted),
        None => datetime_to_julian_day(dt).add_seconds(seconds),
    }
}

/// Convert a proleptic Gregorian calendar date to Julian Date.
///
/// `day` may carry a fractional part (e.g. 1.5 = noon of the 1st).
pub fn calendar_to_jd(year: i32, month: u32, day: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year as f64 - 1.0, month as f64 + 12.0)
    } else {
        (year as f64, month as f64)
    };
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day + b - 1524.5
}

/// Convert a Julian Date to a proleptic Gregorian (year, month, fractional day).
pub fn jd_to_calendar(jd: f64) -> (i32, u32, f64) {
    let z = (jd + 0.5).floor();
    let f = jd + 0.5 - z;
    let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
    let a = z + 1.0 + alpha - (alpha / 4.0).floor();
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = b - d - (30.6001 * e).floor() + f;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };
    (year as i32, month as u32, day)
}

/// Decimal year for a Julian Date (Julian years from J2000.0).
pub fn decimal_year(jd: f64) -> f64 {
    2000.0 + (jd - J2000_JD) / 365.25
}

/// Month number for a three-letter English abbreviation (case-insensitive).
pub(crate) fn month_from_abbrev(s: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(s))
        .map(|i| i as u32 + 1)
}
