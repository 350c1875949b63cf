//! Error types for rectification.

use chrono::{DateTime, Duration, Utc};
use natal_chart::{ChartError, ErrorKind};
use natal_time::TimeError;
use thiserror::Error;

/// Errors from rectification requests.
///
/// Everything except `Chart`, `Time` and `DeadlineExceeded` is raised while
/// validating the request, before the ephemeris is consulted.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum RectificationError {
    #[error("no events or patterns supplied")]
    EmptyEvidence,
    #[error("time window ends ({end}) before it starts ({start})")]
    InvertedWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("time window is empty")]
    EmptyWindow,
    #[error("{weights} weights supplied for {items} evidence items")]
    WeightCountMismatch { weights: usize, items: usize },
    #[error("weight {index} is {value}; weights must be finite and non-negative")]
    InvalidWeight { index: usize, value: f64 },
    #[error("all weights are zero")]
    ZeroWeights,
    #[error("event {index} at {date} precedes the search window")]
    EventBeforeWindow { index: usize, date: DateTime<Utc> },
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    #[error("unknown pattern type: {0}")]
    UnknownPatternType(String),
    #[error("unknown rectification method: {0}")]
    UnknownMethod(String),
    #[error("{method} cannot use {evidence} evidence")]
    MethodMismatch {
        method: &'static str,
        evidence: &'static str,
    },
    #[error("this entry point takes {expected} evidence, got {found}")]
    WrongEvidence {
        expected: &'static str,
        found: &'static str,
    },
    #[error("pattern {index}: {reason}")]
    InvalidPattern { index: usize, reason: &'static str },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("window of ±{half_width} around {center} leaves the supported date range")]
    WindowOutOfRange {
        center: DateTime<Utc>,
        half_width: Duration,
    },
    #[error("window holds {count} candidates, more than the limit of {limit}")]
    TooManyCandidates { count: usize, limit: usize },
    #[error("time budget of {budget_ms} ms ran out before any candidate was scored")]
    DeadlineExceeded { budget_ms: u64 },
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Time(#[from] TimeError),
}

impl RectificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Chart(e) => e.kind(),
            Self::Time(e) if e.is_validation() => ErrorKind::Validation,
            Self::Time(_) | Self::DeadlineExceeded { .. } => ErrorKind::Computation,
            _ => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_are_validation() {
        assert_eq!(RectificationError::EmptyEvidence.kind(), ErrorKind::Validation);
        assert_eq!(
            RectificationError::UnknownEventType("wedding".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RectificationError::DeadlineExceeded { budget_ms: 0 }.kind(),
            ErrorKind::Computation
        );
    }

    #[test]
    fn chart_errors_keep_their_kind() {
        let e: RectificationError = ChartError::Computation("nan".into()).into();
        assert_eq!(e.kind(), ErrorKind::Computation);
        let e: RectificationError = ChartError::InvalidConfig("orb").into();
        assert_eq!(e.kind(), ErrorKind::Validation);
    }
}
