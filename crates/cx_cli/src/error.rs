//! Errors raised by CLI commands.

use std::path::PathBuf;

use thiserror::Error;

use cx_ruleset::Severity;

/// Command outcomes that map to a specific exit code.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Given schema path is invalid: {0}")]
    InvalidSchemaPath(PathBuf),

    #[error("OpenAPI directory not found: {0}")]
    SchemaDirNotFound(PathBuf),

    #[error("No OpenAPI schema found in {0}")]
    NoSchemas(PathBuf),

    #[error("{count} schema(s) could not be read")]
    Unreadable { count: usize },

    #[error("OpenAPI validation failed: {failing} file(s) with {threshold} or worse")]
    LintFailed { failing: usize, threshold: Severity },

    #[error("Ruleset validation failed with {errors} error(s)")]
    RulesetInvalid { errors: usize },
}
