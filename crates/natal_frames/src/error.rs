//! Error types for the position model.

use thiserror::Error;

use crate::position::CoordinateSystem;

/// Errors from constructing or converting a [`crate::Position`].
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FrameError {
    #[error("latitude {0}° is outside [-90, 90]")]
    InvalidLatitude(f64),
    #[error("distance {0} is negative")]
    InvalidDistance(f64),
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
    #[error("cannot convert {from:?} coordinates to {to:?}")]
    UnsupportedConversion {
        from: CoordinateSystem,
        to: CoordinateSystem,
    },
    #[error("unknown coordinate system: {0}")]
    UnknownCoordinateSystem(String),
}
