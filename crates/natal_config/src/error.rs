//! Configuration errors.

use std::path::PathBuf;

use natal_chart::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("invalid [{section}] config: {message}")]
    Invalid {
        section: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(section: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Invalid {
            section,
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::Serialize(_) => ErrorKind::Computation,
            Self::Parse(_) | Self::Invalid { .. } => ErrorKind::Validation,
        }
    }
}
