//! Error types for ruleset operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::selector::SelectorError;

/// Result type alias for ruleset operations.
pub type RulesetResult<T> = Result<T, RulesetError>;

/// Errors that can occur while loading rulesets or documents.
#[derive(Error, Debug)]
pub enum RulesetError {
    #[error("Ruleset not found at path: {0}")]
    NotFound(PathBuf),

    #[error("Ruleset validation failed: {0}")]
    ValidationFailed(String),

    #[error("Circular extends detected: {0}")]
    ExtendsCycle(PathBuf),

    #[error("Invalid override pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid selector: {0}")]
    Selector(#[from] SelectorError),

    #[error("Unsupported document type: {0} (expected .json, .yaml or .yml)")]
    UnsupportedDocument(PathBuf),

    #[error("Invalid document {path}: {message}")]
    InvalidDocument { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
