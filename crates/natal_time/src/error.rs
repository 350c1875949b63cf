//! Error types for time conversions.

use thiserror::Error;

/// Errors from time-scale conversion, timezone handling, or LSK parsing.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimeError {
    /// LSK file parsing failed.
    #[error("LSK parse error: {0}")]
    LskParse(String),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
    /// UTC epoch is before 1972-Jan-01 (pre-modern leap seconds).
    #[error("UTC before 1972-Jan-01 is not supported")]
    Pre1972Utc,
    /// Time system name not one of UTC, TAI, TT.
    #[error("unknown time system: {0}")]
    UnknownTimeSystem(String),
    /// Timezone designator could not be interpreted.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    /// A local timestamp was given without any zone or offset.
    #[error("timestamp has no timezone or UTC offset: {0}")]
    MissingTimezone(String),
    /// Timestamp text is malformed or names a nonexistent instant.
    #[error("invalid datetime: {0}")]
    InvalidDateTime(String),
    /// Julian Day is non-finite or outside the representable calendar range.
    #[error("Julian Day {0} is outside the supported range")]
    JulianDayOutOfRange(f64),
}

impl TimeError {
    /// True for malformed or out-of-domain input, false for data-source failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::LskParse(_) | Self::Io(_))
    }
}

impl From<std::io::Error> for TimeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
