//! Lint diagnostics and reports.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::rule::Severity;
use crate::selector::DocumentPath;

/// One rule violation at one location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the rule that produced it
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub path: DocumentPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

/// Diagnostic counts per severity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub hints: usize,
}

impl ReportSummary {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos + self.hints
    }
}

/// Every diagnostic produced for one document, in a stable order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LintReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Whether any diagnostic is at or above `threshold`.
    pub fn has_failures(&self, threshold: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity.at_least(threshold))
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            errors: self.count(Severity::Error),
            warnings: self.count(Severity::Warn),
            infos: self.count(Severity::Info),
            hints: self.count(Severity::Hint),
        }
    }

    /// Only the diagnostics produced by `code`.
    pub fn for_rule<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }
}
