//! Error type for the facade.

use natal_chart::{ChartError, ErrorKind};
use natal_config::ConfigError;
use natal_frames::FrameError;
use natal_search::RectificationError;
use natal_time::TimeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum NatalError {
    /// The request could not be understood.
    #[error("invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Rectification(#[from] RectificationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl NatalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Frame(_) => ErrorKind::Validation,
            Self::Time(e) if e.is_validation() => ErrorKind::Validation,
            Self::Time(_) => ErrorKind::Computation,
            Self::Chart(e) => e.kind(),
            Self::Rectification(e) => e.kind(),
            Self::Config(e) => e.kind(),
        }
    }
}
