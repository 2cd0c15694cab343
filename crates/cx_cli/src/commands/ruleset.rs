//! Ruleset command - Inspect ruleset files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::info;

use cx_functions::FunctionRegistry;
use cx_ruleset::{Ruleset, RulesetValidator};

use crate::error::CliError;

#[derive(Args)]
pub struct RulesetArgs {
    #[command(subcommand)]
    pub command: RulesetCommands,
}

#[derive(Subcommand)]
pub enum RulesetCommands {
    /// Check a ruleset for unknown functions, bad selectors and dangling entries
    Check(CheckArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Ruleset file (defaults to the built-in ruleset)
    #[arg(long, env = "CX_CLI_RULESET")]
    pub ruleset: Option<PathBuf>,
}

/// Load the ruleset at `path`, or the embedded one.
pub fn load_ruleset(path: Option<&Path>) -> Result<Ruleset> {
    match path {
        Some(path) => {
            info!("Loading ruleset from: {:?}", path);
            Ruleset::from_file(path)
                .with_context(|| format!("Failed to load ruleset {}", path.display()))
        }
        None => {
            info!("Using built-in ruleset");
            Ruleset::embedded().context("Failed to load built-in ruleset")
        }
    }
}

pub async fn execute(args: RulesetArgs, quiet: bool) -> Result<()> {
    match args.command {
        RulesetCommands::Check(args) => check(args, quiet),
    }
}

fn check(args: CheckArgs, quiet: bool) -> Result<()> {
    let ruleset = load_ruleset(args.ruleset.as_deref())?;
    let result = RulesetValidator::validate(&ruleset, &FunctionRegistry::with_builtins());

    if !quiet {
        println!("📋 Checking ruleset ({} rules)...", ruleset.rules.len());
    }

    if result.valid {
        println!("   ✅ Ruleset is valid");
    } else {
        println!("   ❌ Ruleset has errors:");
        for error in &result.errors {
            println!("      - {}", error);
        }
    }

    for warning in &result.warnings {
        println!("   ⚠️  {}", warning);
    }

    if !result.valid {
        return Err(CliError::RulesetInvalid {
            errors: result.errors.len(),
        }
        .into());
    }
    Ok(())
}
