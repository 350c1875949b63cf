//! UTC ⇄ TAI ⇄ TT conversions.
//!
//! Conversions work on `NaiveDateTime` wall-clock readings of each scale
//! with integer nanosecond offsets, so A → B → A returns the input exactly.
//!
//! - TAI = UTC + ΔAT, ΔAT from the leap-second table (1972 onward).
//! - TT  = TAI + 32.184 s.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::TimeError;
use crate::lsk;

/// TT − TAI in milliseconds.
pub const TT_MINUS_TAI_MS: i64 = 32_184;

/// Atomic/civil time scales understood by [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeSystem {
    Utc,
    Tai,
    Tt,
}

impl TimeSystem {
    pub const ALL: [Self; 3] = [Self::Utc, Self::Tai, Self::Tt];

    pub fn name(self) -> &'static str {
        match self {
            Self::Utc => "UTC",
            Self::Tai => "TAI",
            Self::Tt => "TT",
        }
    }
}

impl fmt::Display for TimeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeSystem {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ts| ts.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TimeError::UnknownTimeSystem(s.to_string()))
    }
}

/// A leap-second step: from `utc_start` onward, TAI − UTC = `tai_minus_utc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeapSecond {
    pub utc_start: NaiveDateTime,
    pub tai_minus_utc: i32,
}

/// IERS leap-second history as (year, month, TAI − UTC).
const BUILTIN_STEPS: [(i32, u32, i32); 28] = [
    (1972, 1, 10),
    (1972, 7, 11),
    (1973, 1, 12),
    (1974, 1, 13),
    (1975, 1, 14),
    (1976, 1, 15),
    (1977, 1, 16),
    (1978, 1, 17),
    (1979, 1, 18),
    (1980, 1, 19),
    (1981, 7, 20),
    (1982, 7, 21),
    (1983, 7, 22),
    (1985, 7, 23),
    (1988, 1, 24),
    (1990, 1, 25),
    (1991, 1, 26),
    (1992, 7, 27),
    (1993, 7, 28),
    (1994, 7, 29),
    (1996, 1, 30),
    (1997, 7, 31),
    (1999, 1, 32),
    (2006, 1, 33),
    (2009, 1, 34),
    (2012, 7, 35),
    (2015, 7, 36),
    (2017, 1, 37),
];

/// Leap-second table, sorted by `utc_start`.
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSecondTable {
    entries: Vec<LeapSecond>,
}

impl Default for LeapSecondTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LeapSecondTable {
    /// The embedded IERS table (last step 2017-01-01, TAI − UTC = 37 s).
    pub fn builtin() -> Self {
        let entries = BUILTIN_STEPS
            .iter()
            .filter_map(|&(y, m, offset)| {
                NaiveDate::from_ymd_opt(y, m, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|utc_start| LeapSecond {
                        utc_start,
                        tai_minus_utc: offset,
                    })
            })
            .collect();
        Self { entries }
    }

    /// Load an LSK file (e.g. `naif0012.tls`) from a path.
    pub fn load(path: &Path) -> Result<Self, TimeError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_lsk(&content)
    }

    /// Build a table from LSK text content.
    pub fn parse_lsk(content: &str) -> Result<Self, TimeError> {
        let data = lsk::parse_lsk(content)?;
        if (data.delta_t_a * 1000.0).round() as i64 != TT_MINUS_TAI_MS {
            return Err(TimeError::LskParse(format!(
                "unexpected DELTET/DELTA_T_A {}",
                data.delta_t_a
            )));
        }
        let entries: Vec<LeapSecond> = data
            .leap_seconds
            .into_iter()
            .filter_map(|(offset, date)| {
                date.and_hms_opt(0, 0, 0).map(|utc_start| LeapSecond {
                    utc_start,
                    tai_minus_utc: offset,
                })
            })
            .collect();
        if entries.is_empty() {
            return Err(TimeError::LskParse("empty leap-second table".into()));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LeapSecond] {
        &self.entries
    }

    /// TAI − UTC in seconds at a UTC reading.
    pub fn tai_minus_utc(&self, utc: NaiveDateTime) -> Result<i32, TimeError> {
        self.entries
            .iter()
            .rev()
            .find(|e| utc >= e.utc_start)
            .map(|e| e.tai_minus_utc)
            .ok_or(TimeError::Pre1972Utc)
    }

    /// TAI − UTC in seconds at a TAI reading.
    ///
    /// Picks the latest step whose start, expressed in TAI, is not after `tai`.
    pub fn tai_minus_utc_at_tai(&self, tai: NaiveDateTime) -> Result<i32, TimeError> {
        self.entries
            .iter()
            .rev()
            .find(|e| tai >= e.utc_start + TimeDelta::seconds(i64::from(e.tai_minus_utc)))
            .map(|e| e.tai_minus_utc)
            .ok_or(TimeError::Pre1972Utc)
    }
}

fn shift(t: NaiveDateTime, delta: TimeDelta) -> Result<NaiveDateTime, TimeError> {
    t.checked_add_signed(delta)
        .ok_or_else(|| TimeError::InvalidDateTime(format!("{t} shifted by {delta} overflows")))
}

/// Convert a wall-clock reading from one time scale to another.
pub fn convert(
    t: NaiveDateTime,
    from: TimeSystem,
    to: TimeSystem,
    table: &LeapSecondTable,
) -> Result<NaiveDateTime, TimeError> {
    let tai = match from {
        TimeSystem::Tai => t,
        TimeSystem::Tt => shift(t, -TimeDelta::milliseconds(TT_MINUS_TAI_MS))?,
        TimeSystem::Utc => {
            let offset = table.tai_minus_utc(t)?;
            shift(t, TimeDelta::seconds(i64::from(offset)))?
        }
    };
    match to {
        TimeSystem::Tai => Ok(tai),
        TimeSystem::Tt => shift(tai, TimeDelta::milliseconds(TT_MINUS_TAI_MS)),
        TimeSystem::Utc => {
            let offset = table.tai_minus_utc_at_tai(tai)?;
            shift(tai, -TimeDelta::seconds(i64::from(offset)))
        }
    }
}

/// Convert between named time systems (`"UTC"`, `"TAI"`, `"TT"`).
pub fn convert_named(
    t: NaiveDateTime,
    from: &str,
    to: &str,
    table: &LeapSecondTable,
) -> Result<NaiveDateTime, TimeError> {
    convert(t, from.parse()?, to.parse()?, table)
}
