//! CLI command definitions.
//!
//! This module defines the command structure for the cx-lifecycle CLI.

use clap::{Parser, Subcommand};

pub mod openapi;
pub mod ruleset;

/// cx-cli - cx-lifecycle command line tool
#[derive(Parser)]
#[command(name = "cx-cli")]
#[command(version, about = "cx-lifecycle command line tool")]
#[command(long_about = r#"
cx-cli validates the OpenAPI documents of a cx-lifecycle project against a
declarative ruleset.

COMMANDS:
  openapi validate  → Lint one OpenAPI file, or every schema in the project
  openapi rules     → List the rules that validation applies
  ruleset check     → Check a ruleset file for errors

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate OpenAPI documents
    Openapi(openapi::OpenapiArgs),

    /// Inspect ruleset files
    Ruleset(ruleset::RulesetArgs),
}
