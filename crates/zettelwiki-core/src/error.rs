//! Error types for the linking engine.
//!
//! All errors in the system are represented by the [`Error`] enum.
//! Most of the pipeline is total; errors surface only at the edges
//! (body size limits, configuration and snapshot loading) and are
//! degraded by callers rather than propagated into a corpus build.

use crate::models::DocumentId;
use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all ZettelWiki operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Document body exceeds the extraction limit
    #[error("Body of document {id} too large ({size} bytes, max {max} bytes)")]
    BodyTooLarge { id: DocumentId, size: usize, max: usize },

    /// A generated match pattern could not be compiled
    #[error("Invalid pattern: {reason}")]
    InvalidPattern { reason: String },

    /// Parse error
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a body too large error
    pub fn body_too_large(id: DocumentId, size: usize, max: usize) -> Self {
        Error::BodyTooLarge { id, size, max }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(reason: impl Into<String>) -> Self {
        Error::InvalidPattern {
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
