//! Error types for chart computation.

use std::fmt;

use natal_core::EphemerisError;
use natal_frames::FrameError;
use natal_time::TimeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification shared by every error in the workspace.
///
/// `Validation` means the request itself was unusable and nothing was
/// computed. `Computation` means valid input hit a failure downstream
/// (ephemeris lookup, data source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    Computation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => f.write_str("validation"),
            Self::Computation => f.write_str("computation"),
        }
    }
}

/// Errors from chart, house, and aspect computation.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ChartError {
    /// Malformed or out-of-domain input.
    #[error("invalid input: {0}")]
    Validation(String),
    /// A configuration value failed `validate()`.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
    /// Valid input that could not be evaluated.
    #[error("computation failed: {0}")]
    Computation(String),
}

impl ChartError {
    pub fn kind(&self) -> ErrorKind {
        let validation = match self {
            Self::Validation(_) | Self::InvalidConfig(_) | Self::Frame(_) => true,
            Self::Time(e) => e.is_validation(),
            Self::Ephemeris(e) => e.is_validation(),
            Self::Computation(_) => false,
        };
        if validation {
            ErrorKind::Validation
        } else {
            ErrorKind::Computation
        }
    }
}
