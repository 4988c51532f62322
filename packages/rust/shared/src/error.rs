//! Error types for bookmuse.
//!
//! Library crates use [`BookmuseError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all bookmuse operations.
#[derive(Debug, thiserror::Error)]
pub enum BookmuseError {
    /// Configuration loading/validation error, or a missing credential.
    /// Detected before any external call is made.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure (connect, timeout, body read) on an
    /// external call. Recoverable per source in the catalog layer.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status from an external service.
    #[error("http status {status}: {message}")]
    Status { status: u16, message: String },

    /// Text-generation output that does not match the expected shape.
    /// Fatal to the run; never guessed or auto-corrected.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Data validation error (profile bounds, invalid answer label, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BookmuseError>;

impl BookmuseError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-response error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for transport-level failures that a bounded retry may recover.
    /// Status-level and malformed failures are never retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
