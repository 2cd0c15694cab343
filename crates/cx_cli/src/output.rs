//! Rendering of lint reports.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use cx_ruleset::{LintReport, ReportSummary, Severity};

/// Output format for lint results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per diagnostic, grouped by file
    Text,
    /// A single JSON document
    Json,
}

/// Lowest severity that fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailSeverity {
    Error,
    Warn,
    Info,
    Hint,
}

impl From<FailSeverity> for Severity {
    fn from(value: FailSeverity) -> Self {
        match value {
            FailSeverity::Error => Severity::Error,
            FailSeverity::Warn => Severity::Warn,
            FailSeverity::Info => Severity::Info,
            FailSeverity::Hint => Severity::Hint,
        }
    }
}

/// A schema that could not be read or parsed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReadFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Everything a `validate` run produced.
#[derive(Debug, Default)]
pub struct LintRun {
    pub reports: Vec<LintReport>,
    pub failures: Vec<ReadFailure>,
}

impl LintRun {
    /// Reports with a diagnostic at or above `threshold`.
    pub fn failing(&self, threshold: Severity) -> usize {
        self.reports.iter().filter(|r| r.has_failures(threshold)).count()
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    generated_at: DateTime<Utc>,
    passed: bool,
    fail_severity: Severity,
    summary: ReportSummary,
    reports: &'a [LintReport],
    failures: &'a [ReadFailure],
}

/// Sum the summaries of several reports.
pub fn combined_summary(reports: &[LintReport]) -> ReportSummary {
    reports
        .iter()
        .map(LintReport::summary)
        .fold(ReportSummary::default(), |acc, s| ReportSummary {
            errors: acc.errors + s.errors,
            warnings: acc.warnings + s.warnings,
            infos: acc.infos + s.infos,
            hints: acc.hints + s.hints,
        })
}

pub fn render(run: &LintRun, format: OutputFormat, fail_severity: Severity) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(run)),
        OutputFormat::Json => render_json(run, fail_severity),
    }
}

/// Stylish text: the file name, then `path  severity  code  message` lines.
pub fn render_text(run: &LintRun) -> String {
    let mut out = String::new();

    for report in run.reports.iter().filter(|r| !r.is_clean()) {
        let source = report
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<input>".to_string());
        let _ = writeln!(out, "{}", source);

        // Padding counts chars, so widths must too
        let width = report
            .diagnostics
            .iter()
            .map(|d| d.path.to_string().chars().count())
            .max()
            .unwrap_or(0);

        for diagnostic in &report.diagnostics {
            let _ = writeln!(
                out,
                "  {:<width$}  {:<5}  {}  {}",
                diagnostic.path.to_string(),
                diagnostic.severity.as_str(),
                diagnostic.code,
                diagnostic.message,
                width = width
            );
        }
        out.push('\n');
    }

    for failure in &run.failures {
        let _ = writeln!(out, "{}", failure.source.display());
        let _ = writeln!(out, "  ❌ {}", failure.message);
        out.push('\n');
    }

    let summary = combined_summary(&run.reports);
    if summary.total() == 0 && run.failures.is_empty() {
        let _ = writeln!(out, "✅ No problems found in {} file(s)", run.reports.len());
        return out;
    }

    if summary.total() > 0 {
        let _ = writeln!(
            out,
            "✖ {} problems ({} errors, {} warnings, {} infos, {} hints)",
            summary.total(),
            summary.errors,
            summary.warnings,
            summary.infos,
            summary.hints
        );
    }
    if !run.failures.is_empty() {
        let _ = writeln!(out, "❌ {} file(s) could not be read", run.failures.len());
    }

    out
}

pub fn render_json(run: &LintRun, fail_severity: Severity) -> Result<String> {
    let output = JsonOutput {
        generated_at: Utc::now(),
        passed: run.failing(fail_severity) == 0 && run.failures.is_empty(),
        fail_severity,
        summary: combined_summary(&run.reports),
        reports: &run.reports,
        failures: &run.failures,
    };
    serde_json::to_string_pretty(&output).context("Failed to serialize lint results")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_ruleset::{Diagnostic, DocumentPath, PathSegment};

    fn diagnostic(path: &str) -> Diagnostic {
        Diagnostic {
            code: "openapi-version".to_string(),
            message: "field \"openapi\" is \"3.0.0\", expected \"3.1.0\"".to_string(),
            severity: Severity::Error,
            path: DocumentPath(vec![PathSegment::Key(path.into())]),
            source: Some(PathBuf::from("specs/pets.yaml")),
        }
    }

    fn run(diagnostics: Vec<Diagnostic>) -> LintRun {
        LintRun {
            reports: vec![LintReport {
                source: Some(PathBuf::from("specs/pets.yaml")),
                diagnostics,
            }],
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_text_lists_diagnostics() {
        let text = render_text(&run(vec![diagnostic("openapi")]));
        assert!(text.starts_with("specs/pets.yaml\n"));
        assert!(text.contains("  openapi  error  openapi-version  field \"openapi\""));
        assert!(text.contains("1 problems (1 errors, 0 warnings"));
    }

    #[test]
    fn test_text_aligns_non_ascii_paths() {
        let text = render_text(&run(vec![diagnostic("résumé"), diagnostic("openapi")]));
        assert!(text.contains("  résumé   error"));
        assert!(text.contains("  openapi  error"));
    }

    #[test]
    fn test_text_clean() {
        let text = render_text(&LintRun {
            reports: vec![LintReport::default()],
            failures: Vec::new(),
        });
        assert_eq!(text, "✅ No problems found in 1 file(s)\n");
    }

    #[test]
    fn test_text_lists_read_failures() {
        let mut lint_run = run(Vec::new());
        lint_run.failures.push(ReadFailure {
            source: PathBuf::from("specs/broken.json"),
            message: "Invalid document".to_string(),
        });

        let text = render_text(&lint_run);
        assert!(text.contains("specs/broken.json\n  ❌ Invalid document"));
        assert!(text.ends_with("❌ 1 file(s) could not be read\n"));
        assert!(!text.contains("No problems found"));
    }

    #[test]
    fn test_json_output() {
        let json = render_json(&run(vec![diagnostic("openapi")]), Severity::Error).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["reports"][0]["diagnostics"][0]["code"], "openapi-version");
        assert_eq!(value["failures"], serde_json::json!([]));
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_fail_severity_conversion() {
        assert_eq!(Severity::from(FailSeverity::Warn), Severity::Warn);
    }
}
