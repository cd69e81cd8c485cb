//! Unified error types for the ACRE ecosystem
//!
//! This module provides a common error type [`AcreError`] that can represent
//! errors from any part of the system. Domain-specific error types can be
//! converted to `AcreError` for uniform error handling at API boundaries.
//!
//! # Example
//!
//! ```ignore
//! use acre_core::{AcreError, AcreResult};
//!
//! fn plan_season(path: &str) -> AcreResult<()> {
//!     let weather = load_weather(path)?;
//!     optimize(&weather)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all ACRE operations.
///
/// This enum provides a common error representation for the ACRE ecosystem,
/// allowing errors from I/O, parsing, optimization, and validation to be
/// handled uniformly.
#[derive(Error, Debug)]
pub enum AcreError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Optimizer/algorithm errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invariant violations detected at a checkpoint (indicates a bug)
    #[error("Internal inconsistency: {0}")]
    Internal(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using AcreError.
pub type AcreResult<T> = Result<T, AcreError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for AcreError {
    fn from(err: anyhow::Error) -> Self {
        AcreError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for AcreError {
    fn from(s: String) -> Self {
        AcreError::Other(s)
    }
}

impl From<&str> for AcreError {
    fn from(s: &str) -> Self {
        AcreError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AcreError::Solver("no viable candidates".into());
        assert!(err.to_string().contains("Solver error"));
        assert!(err.to_string().contains("no viable candidates"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let acre_err: AcreError = io_err.into();
        assert!(matches!(acre_err, AcreError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> AcreResult<()> {
            Err(AcreError::Validation("test".into()))
        }

        fn outer() -> AcreResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
