//! Error types for simstat
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Most failures in the analysis pipeline are deliberately *not* errors:
//! a missing log or an unparseable metric value degrades a single field to
//! "unavailable". The variants here cover the cases a caller must see.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for simstat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for simstat
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required input file does not exist
    #[error("not found: {}", path.display())]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The telemetry store could not be opened or queried
    #[error("store error: {reason}")]
    Store {
        /// Underlying driver message
        reason: String,
    },

    /// A location rule or extraction pattern failed to compile
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Offending pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Configuration file could not be read or is inconsistent
    #[error("config error: {reason}")]
    Config {
        /// What went wrong
        reason: String,
    },

    /// Caller supplied an argument the operation cannot work with
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What went wrong
        reason: String,
    },
}

impl Error {
    /// Build a `Store` error from any displayable driver error.
    pub fn store(reason: impl std::fmt::Display) -> Self {
        Error::Store {
            reason: reason.to_string(),
        }
    }

    /// Build a `Config` error.
    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }

    /// Build an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// True when the error means "the resource is not there" rather than
    /// "the resource is broken".
    pub fn is_missing_resource(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound {
            path: PathBuf::from("normal/fir/akita_sim.sqlite3"),
        };
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("akita_sim.sqlite3"));
    }

    #[test]
    fn test_error_display_store() {
        let err = Error::store("no such table: mgpusim_metrics");
        let msg = err.to_string();
        assert!(msg.contains("store error"));
        assert!(msg.contains("mgpusim_metrics"));
    }

    #[test]
    fn test_error_display_invalid_pattern() {
        let err = Error::InvalidPattern {
            pattern: "GPU[".to_string(),
            reason: "unclosed character class".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GPU["));
        assert!(msg.contains("unclosed"));
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::config("tail_lines must be positive");
        assert!(err.to_string().contains("config error"));
    }

    #[test]
    fn test_missing_resource_classification() {
        assert!(Error::NotFound {
            path: PathBuf::from("x")
        }
        .is_missing_resource());
        assert!(Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone")).is_missing_resource());
        assert!(!Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "no")).is_missing_resource());
        assert!(!Error::store("locked").is_missing_resource());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
