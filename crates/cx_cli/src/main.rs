//! cx-lifecycle CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod error;
mod output;
mod settings;

use commands::{Cli, Commands};
use cx_ruleset::RulesetError;
use error::CliError;
use settings::ConfigError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "cx=debug,info"
    } else if cli.quiet {
        "error"
    } else {
        "cx=info,warn"
    };

    // Logging may already be initialized; continue either way
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();

    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::Openapi(args) => commands::openapi::execute(args, quiet).await,
        Commands::Ruleset(args) => commands::ruleset::execute(args, quiet).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return match err {
                CliError::LintFailed { .. } | CliError::RulesetInvalid { .. } => {
                    ExitCodes::VALIDATION_FAILURE
                }
                CliError::InvalidSchemaPath(_) => ExitCodes::INVALID_ARGS,
                CliError::SchemaDirNotFound(_)
                | CliError::NoSchemas(_)
                | CliError::Unreadable { .. } => ExitCodes::GENERAL_ERROR,
            };
        }
        if cause.is::<RulesetError>() || cause.is::<ConfigError>() {
            return ExitCodes::INVALID_ARGS;
        }
    }
    ExitCodes::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use cx_ruleset::Severity;
    use std::path::PathBuf;

    #[test]
    fn test_lint_failures_use_validation_code() {
        let err = anyhow::Error::from(CliError::LintFailed {
            failing: 2,
            threshold: Severity::Error,
        });
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_broken_ruleset_is_an_argument_error() {
        let err = Err::<(), _>(RulesetError::ValidationFailed("unknown function".into()))
            .context("Failed to prepare ruleset")
            .unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_message_text_does_not_pick_the_code() {
        let err = anyhow::anyhow!("Failed to read validation.json: invalid document");
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);

        let err = anyhow::Error::from(CliError::Unreadable { count: 1 });
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);

        let err = anyhow::Error::from(CliError::InvalidSchemaPath(PathBuf::from("x.txt")));
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }
}
