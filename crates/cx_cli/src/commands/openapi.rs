//! OpenAPI command - Validate OpenAPI documents against a ruleset.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use cx_functions::FunctionRegistry;
use cx_ruleset::{Document, DocumentFormat, Linter, Severity};

use crate::commands::ruleset::load_ruleset;
use crate::error::CliError;
use crate::output::{self, FailSeverity, LintRun, OutputFormat, ReadFailure};
use crate::settings::{ProjectConfig, DEFAULT_CONFIG_PATH};

/// Marker for sample documents that are never validated.
const EXAMPLE_MARKER: &str = ".example";

#[derive(Args)]
pub struct OpenapiArgs {
    #[command(subcommand)]
    pub command: OpenapiCommands,
}

#[derive(Subcommand)]
pub enum OpenapiCommands {
    /// Lint an OpenAPI file, or every schema in the project's OpenAPI directory
    Validate(ValidateArgs),

    /// List the rules applied by validate
    Rules(RulesArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    /// OpenAPI file to validate (.json, .yaml or .yml)
    pub spec: Option<PathBuf>,

    /// Ruleset file (defaults to the built-in ruleset)
    #[arg(long, env = "CX_CLI_RULESET")]
    pub ruleset: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Lowest severity that fails the run
    #[arg(long, value_enum, default_value_t = FailSeverity::Error)]
    pub fail_severity: FailSeverity,

    /// Project config used to find schemas when no file is given
    #[arg(long, env = "CX_CLI_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct RulesArgs {
    /// Ruleset file (defaults to the built-in ruleset)
    #[arg(long, env = "CX_CLI_RULESET")]
    pub ruleset: Option<PathBuf>,
}

pub async fn execute(args: OpenapiArgs, quiet: bool) -> Result<()> {
    match args.command {
        OpenapiCommands::Validate(args) => validate(args, quiet).await,
        OpenapiCommands::Rules(args) => rules(args),
    }
}

async fn validate(args: ValidateArgs, quiet: bool) -> Result<()> {
    let schemas = match &args.spec {
        Some(spec) => {
            if !spec.is_file() || DocumentFormat::from_path(spec).is_none() {
                return Err(CliError::InvalidSchemaPath(spec.clone()).into());
            }
            vec![spec.clone()]
        }
        None => {
            let project_root = std::env::current_dir()?;
            let config = ProjectConfig::load(&args.config)?;
            let dir = config.openapi_dir(&args.config, &project_root)?;
            discover_schemas(&dir)?
        }
    };

    let ruleset = load_ruleset(args.ruleset.as_deref())?;
    let linter = Linter::new(ruleset, FunctionRegistry::with_builtins())
        .context("Failed to prepare ruleset")?;

    if !quiet && args.format == OutputFormat::Text {
        println!("🔍 Validating {} OpenAPI schema(s)...", schemas.len());
        println!();
    }

    let run = lint_files(Arc::new(linter), schemas).await?;
    let fail_severity = Severity::from(args.fail_severity);

    print!("{}", output::render(&run, args.format, fail_severity)?);

    if !run.failures.is_empty() {
        return Err(CliError::Unreadable {
            count: run.failures.len(),
        }
        .into());
    }

    let failing = run.failing(fail_severity);
    if failing > 0 {
        return Err(CliError::LintFailed {
            failing,
            threshold: fail_severity,
        }
        .into());
    }

    Ok(())
}

/// Every `.json`, `.yaml` or `.yml` file directly inside `dir`, sorted,
/// skipping `.example` samples.
pub fn discover_schemas(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CliError::SchemaDirNotFound(dir.to_path_buf()).into());
    }

    let schemas: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| DocumentFormat::from_path(path).is_some())
        .filter(|path| {
            !path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(EXAMPLE_MARKER))
        })
        .collect();

    if schemas.is_empty() {
        return Err(CliError::NoSchemas(dir.to_path_buf()).into());
    }

    debug!("Discovered {} schema(s) in {:?}", schemas.len(), dir);
    Ok(schemas)
}

/// Read and lint every file concurrently. Reports keep the input order, and
/// files that cannot be read are collected instead of stopping the run.
pub async fn lint_files(linter: Arc<Linter>, paths: Vec<PathBuf>) -> Result<LintRun> {
    let mut tasks = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        let linter = Arc::clone(&linter);
        tasks.spawn_blocking(move || {
            let outcome = Document::from_path(&path)
                .map(|document| linter.lint(&document))
                .map_err(|e| e.to_string());
            (index, path, outcome)
        });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("Lint task failed")?);
    }
    outcomes.sort_by_key(|(index, _, _)| *index);

    let mut run = LintRun::default();
    for (_, path, outcome) in outcomes {
        match outcome {
            Ok(report) => run.reports.push(report),
            Err(message) => {
                warn!("Failed to read {}: {}", path.display(), message);
                run.failures.push(ReadFailure {
                    source: path,
                    message,
                });
            }
        }
    }

    info!(
        "Linted {} file(s), {} unreadable",
        run.reports.len(),
        run.failures.len()
    );
    Ok(run)
}

fn rules(args: RulesArgs) -> Result<()> {
    let ruleset = load_ruleset(args.ruleset.as_deref())?;

    for (name, rule) in &ruleset.rules {
        let severity = ruleset
            .effective_severity(name, None)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "off".to_string());
        let functions: Vec<&str> = rule.functions().collect();

        println!("{:<24} {:<5} {}", name, severity, functions.join(", "));
        if let Some(description) = &rule.description {
            println!("    {}", description);
        }
    }

    Ok(())
}
