//! Unified error types for the EVSA ecosystem
//!
//! This module provides a common error type [`EvsaError`] that can represent
//! errors from any part of the system. Domain-specific error types can be
//! converted to `EvsaError` for uniform error handling at API boundaries.
//!
//! # Example
//!
//! ```ignore
//! use evsa_core::{EvsaError, EvsaResult};
//!
//! fn run_scenario(path: &str) -> EvsaResult<()> {
//!     let scenario = load_scenario(path)?;
//!     solve_allocation(&scenario)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all EVSA operations.
///
/// This enum provides a common error representation for the EVSA ecosystem,
/// allowing errors from I/O, parsing, solving, and validation to be handled
/// uniformly.
#[derive(Error, Debug)]
pub enum EvsaError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Solver/algorithm errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using EvsaError.
pub type EvsaResult<T> = Result<T, EvsaError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for EvsaError {
    fn from(err: anyhow::Error) -> Self {
        EvsaError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for EvsaError {
    fn from(s: String) -> Self {
        EvsaError::Other(s)
    }
}

impl From<&str> for EvsaError {
    fn from(s: &str) -> Self {
        EvsaError::Other(s.to_string())
    }
}

// JSON parsing errors
impl From<serde_json::Error> for EvsaError {
    fn from(err: serde_json::Error) -> Self {
        EvsaError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvsaError::Solver("allocation search failed".into());
        assert!(err.to_string().contains("Solver error"));
        assert!(err.to_string().contains("allocation search failed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let evsa_err: EvsaError = io_err.into();
        assert!(matches!(evsa_err, EvsaError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let evsa_err: EvsaError = json_err.into();
        assert!(matches!(evsa_err, EvsaError::Parse(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn example_fn() -> EvsaResult<i32> {
            Ok(42)
        }
        assert_eq!(example_fn().unwrap(), 42);
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> EvsaResult<()> {
            Err(EvsaError::Validation("test".into()))
        }

        fn outer() -> EvsaResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
