//! Error types for the fdscript protocol layer

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for script assembly, list generation and result parsing
#[derive(Error, Debug)]
pub enum FdError {
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Unknown result category '{0}'")]
    UnknownCategory(String),

    #[error("Malformed mapping directive: {0}")]
    MalformedMapping(String),

    #[error("Failed to parse result file {path:?}: {cause}")]
    ParseFailure { path: PathBuf, cause: String },

    #[error("Unsupported command for read: <{0}>")]
    UnsupportedRoundTrip(String),

    #[error("Cannot resolve path {path:?}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FdError {
    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        FdError::Xml(err.to_string())
    }

    pub(crate) fn parse_failure(path: impl Into<PathBuf>, cause: impl Into<String>) -> Self {
        FdError::ParseFailure {
            path: path.into(),
            cause: cause.into(),
        }
    }
}

/// Result type for fdscript operations
pub type FdResult<T> = Result<T, FdError>;
