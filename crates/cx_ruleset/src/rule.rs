//! Rule definitions as written in ruleset documents.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity attached to a rule and to the diagnostics it produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    #[serde(alias = "warning")]
    Warn,
    #[serde(alias = "information")]
    Info,
    Hint,
    /// Disables the rule entirely.
    Off,
}

impl Severity {
    /// Ordering weight; `None` for `Off`.
    pub fn rank(self) -> Option<u8> {
        match self {
            Severity::Error => Some(3),
            Severity::Warn => Some(2),
            Severity::Info => Some(1),
            Severity::Hint => Some(0),
            Severity::Off => None,
        }
    }

    /// Whether this severity is at or above `threshold`.
    pub fn at_least(self, threshold: Severity) -> bool {
        match (self.rank(), threshold.rank()) {
            (Some(own), Some(min)) => own >= min,
            _ => false,
        }
    }

    pub fn is_off(self) -> bool {
        self == Severity::Off
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Hint => "hint",
            Severity::Off => "off",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that may be written either as a single item or as a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => std::slice::from_ref(item),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

/// Binding of a rule to a function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleThen {
    /// Property of the matched fragment to check instead of the fragment
    /// itself. Dotted names descend; `@key` targets the matched key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Registered function name
    pub function: String,
    /// Options handed to the function as-is
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub function_options: Value,
}

impl RuleThen {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            field: None,
            function: function.into(),
            function_options: Value::Null,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.function_options = options;
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

fn default_true() -> bool {
    true
}

/// A named check: selector, function binding and severity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Message template; supports `{{error}}`, `{{description}}`,
    /// `{{path}}` and `{{property}}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    pub given: OneOrMany<String>,
    pub then: OneOrMany<RuleThen>,
    /// Rules that are not recommended only run when extended with `all`.
    #[serde(default = "default_true")]
    pub recommended: bool,
}

impl Rule {
    pub fn new(given: impl Into<String>, then: RuleThen) -> Self {
        Self {
            description: None,
            message: None,
            severity: Severity::default(),
            given: OneOrMany::One(given.into()),
            then: OneOrMany::One(then),
            recommended: true,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether the rule runs at all.
    pub fn is_active(&self) -> bool {
        self.recommended && !self.severity.is_off()
    }

    /// Names of every function the rule invokes.
    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.then.as_slice().iter().map(|t| t.function.as_str())
    }
}

/// A rule entry in a document: a full definition, or a severity or
/// on/off toggle for a rule inherited through `extends`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleEntry {
    Toggle(bool),
    Severity(Severity),
    Definition(Box<Rule>),
}
