//! # cx_ruleset
//!
//! Declarative rulesets for OpenAPI documents, and the runner that applies
//! them.
//!
//! A [`Ruleset`] names rules; each rule selects fragments of a document
//! with a JSONPath [`Selector`] and hands them to a function from
//! [`cx_functions`]. The [`Linter`] turns the results into a sorted
//! [`LintReport`].
//!
//! ## Example
//!
//! ```rust
//! use cx_ruleset::{Document, Linter};
//! use serde_json::json;
//!
//! let linter = Linter::with_defaults().unwrap();
//! let report = linter.lint(&Document::new(json!({"openapi": "3.0.3"})));
//! assert!(report.diagnostics.iter().any(|d| d.code == "openapi-version"));
//! ```

pub mod document;
pub mod error;
pub mod linter;
pub mod report;
pub mod rule;
pub mod ruleset;
pub mod selector;
pub mod validator;

pub use document::{Document, DocumentFormat};
pub use error::{RulesetError, RulesetResult};
pub use linter::Linter;
pub use report::{Diagnostic, LintReport, ReportSummary};
pub use rule::{OneOrMany, Rule, RuleEntry, RuleThen, Severity};
pub use ruleset::{
    normalize_document_path, ExtendsEntry, ExtendsMode, OverrideEntry, ResolvedOverride, Ruleset,
    RulesetDocument, RulesetLoader, EMBEDDED_RULESET,
};
pub use selector::{DocumentPath, PathSegment, Selector, SelectorError};
pub use validator::{RulesetValidator, ValidationResult};
