//! Ephemeris errors.

use thiserror::Error;

use crate::body::Body;

/// Errors from configuring or querying an ephemeris source.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EphemerisError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("unknown body: {0}")]
    UnknownBody(String),
    #[error("{0} is not available from this ephemeris")]
    UnsupportedBody(Body),
    #[error("epoch out of range: JD {jd_tt}")]
    EpochOutOfRange { jd_tt: f64 },
    #[error("no convergence: {0}")]
    NoConvergence(&'static str),
    #[error("ephemeris source failure: {0}")]
    Source(String),
}

impl EphemerisError {
    /// True for caller mistakes (bad config, unknown names), false for lookup failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::UnknownBody(_))
    }
}
