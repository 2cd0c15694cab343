//! Error types for the functions module.

use thiserror::Error;

/// Result type alias for registry operations.
pub type FunctionResultOf<T> = Result<T, FunctionError>;

/// Errors raised by the function registry.
///
/// Rule functions themselves never fail; misconfiguration is reported
/// as a [`crate::FunctionResult`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionError {
    #[error("Function not found: {0}")]
    NotFound(String),
}
