//! Ruleset documents and their resolution.
//!
//! A ruleset document is YAML (or JSON) with four top-level keys:
//!
//! ```yaml
//! extends: [./base.yaml]          # other rulesets to compose
//! functions: [ensureFields]       # custom functions this ruleset needs
//! rules:
//!   info-fields:
//!     severity: error
//!     given: $.info
//!     then:
//!       function: ensureFields
//!       functionOptions: { fields: [title, description] }
//! overrides:
//!   - files: ["legacy/**/*.yaml"]
//!     rules: { info-fields: off }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RulesetError, RulesetResult};
use crate::rule::{OneOrMany, Rule, RuleEntry, Severity};

/// The ruleset shipped with the CLI.
pub const EMBEDDED_RULESET: &str = include_str!("../rulesets/cx-openapi.yaml");

/// How rules inherited through `extends` are activated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtendsMode {
    /// Keep each rule's own `recommended` flag
    #[default]
    Recommended,
    /// Activate every inherited rule
    All,
    /// Inherit rules switched off, to be enabled one by one
    Off,
}

/// An `extends` entry: a reference, optionally paired with a mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExtendsEntry {
    WithMode(String, ExtendsMode),
    Reference(String),
}

impl ExtendsEntry {
    pub fn reference(&self) -> &str {
        match self {
            ExtendsEntry::WithMode(reference, _) | ExtendsEntry::Reference(reference) => reference,
        }
    }

    pub fn mode(&self) -> ExtendsMode {
        match self {
            ExtendsEntry::WithMode(_, mode) => *mode,
            ExtendsEntry::Reference(_) => ExtendsMode::default(),
        }
    }
}

/// Per-file severity overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverrideEntry {
    /// Glob patterns, relative to the ruleset file
    pub files: Vec<String>,
    #[serde(default)]
    pub rules: BTreeMap<String, Severity>,
}

/// A ruleset document exactly as written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RulesetDocument {
    #[serde(default)]
    pub extends: OneOrMany<ExtendsEntry>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleEntry>,
    #[serde(default)]
    pub overrides: Vec<OverrideEntry>,
}

impl RulesetDocument {
    /// Load a document from a YAML or JSON file.
    pub fn from_file(path: &Path) -> RulesetResult<Self> {
        if !path.is_file() {
            return Err(RulesetError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a document from a YAML (or JSON) string.
    pub fn from_yaml(yaml: &str) -> RulesetResult<Self> {
        serde_yaml::from_str(yaml).map_err(RulesetError::from)
    }
}

/// An override with its patterns compiled.
#[derive(Debug, Clone)]
pub struct ResolvedOverride {
    base_dir: Option<PathBuf>,
    patterns: Vec<Pattern>,
    pub rules: BTreeMap<String, Severity>,
}

impl ResolvedOverride {
    /// Whether the override applies to a document at `path`. Relative
    /// paths should go through [`normalize_document_path`] first.
    pub fn matches(&self, path: &Path) -> bool {
        let relative = self
            .base_dir
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .unwrap_or(path);

        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };

        self.patterns.iter().any(|pattern| {
            pattern.matches_path_with(relative, options) || pattern.matches_path_with(path, options)
        })
    }
}

/// A fully resolved ruleset: `extends` merged, overrides compiled.
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    /// File the ruleset was loaded from; `None` when embedded
    pub source: Option<PathBuf>,
    /// Custom functions declared across the ruleset and its parents
    pub functions: Vec<String>,
    pub rules: BTreeMap<String, Rule>,
    pub overrides: Vec<ResolvedOverride>,
    /// Severity or toggle entries naming a rule that does not exist
    pub dangling: Vec<String>,
}

impl Ruleset {
    /// The built-in cx-lifecycle OpenAPI ruleset.
    pub fn embedded() -> RulesetResult<Self> {
        let document = RulesetDocument::from_yaml(EMBEDDED_RULESET)?;
        RulesetLoader::new().resolve(document, None, None)
    }

    /// Load a ruleset file and everything it extends.
    pub fn from_file(path: &Path) -> RulesetResult<Self> {
        RulesetLoader::new().load(path)
    }

    /// Build a ruleset from an in-memory document. Relative `extends`
    /// entries resolve against `base_dir`.
    pub fn from_document(
        document: RulesetDocument,
        base_dir: Option<&Path>,
    ) -> RulesetResult<Self> {
        RulesetLoader::new().resolve(document, base_dir, None)
    }

    /// Severity of a rule for a given document, after overrides.
    pub fn effective_severity(&self, name: &str, document: Option<&Path>) -> Option<Severity> {
        let rule = self.rules.get(name)?;
        if !rule.recommended {
            return None;
        }

        let mut severity = rule.severity;
        if let Some(path) = document.filter(|_| !self.overrides.is_empty()) {
            let path = normalize_document_path(path);
            for entry in self.overrides.iter().filter(|o| o.matches(&path)) {
                if let Some(overridden) = entry.rules.get(name) {
                    severity = *overridden;
                }
            }
        }

        (!severity.is_off()).then_some(severity)
    }

    fn inherit(&mut self, parent: Ruleset, mode: ExtendsMode) {
        for function in parent.functions {
            if !self.functions.contains(&function) {
                self.functions.push(function);
            }
        }

        for (name, mut rule) in parent.rules {
            match mode {
                ExtendsMode::Recommended => {}
                ExtendsMode::All => rule.recommended = true,
                ExtendsMode::Off => rule.severity = Severity::Off,
            }
            self.rules.insert(name, rule);
        }

        self.overrides.extend(parent.overrides);
        self.dangling.extend(parent.dangling);
    }

    fn apply_entry(&mut self, name: String, entry: RuleEntry) {
        match entry {
            RuleEntry::Definition(rule) => {
                self.rules.insert(name, *rule);
            }
            RuleEntry::Severity(severity) => match self.rules.get_mut(&name) {
                Some(rule) => {
                    rule.severity = severity;
                    rule.recommended = true;
                }
                None => self.dangling.push(name),
            },
            RuleEntry::Toggle(enabled) => match self.rules.get_mut(&name) {
                Some(rule) if enabled => {
                    rule.recommended = true;
                    if rule.severity.is_off() {
                        rule.severity = Severity::default();
                    }
                }
                Some(rule) => rule.severity = Severity::Off,
                None => self.dangling.push(name),
            },
        }
    }
}

/// Resolves `extends` chains, guarding against cycles.
#[derive(Debug, Default)]
pub struct RulesetLoader {
    visiting: Vec<PathBuf>,
}

impl RulesetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ruleset file and resolve its `extends` relative to it.
    pub fn load(&mut self, path: &Path) -> RulesetResult<Ruleset> {
        let canonical =
            fs::canonicalize(path).map_err(|_| RulesetError::NotFound(path.to_path_buf()))?;

        if self.visiting.contains(&canonical) {
            return Err(RulesetError::ExtendsCycle(canonical));
        }

        debug!("Loading ruleset from {:?}", canonical);
        let document = RulesetDocument::from_file(&canonical)?;

        self.visiting.push(canonical.clone());
        let base_dir = canonical.parent().map(Path::to_path_buf);
        let resolved = self.resolve(document, base_dir.as_deref(), Some(canonical));
        self.visiting.pop();

        resolved
    }

    /// Resolve a parsed document into a [`Ruleset`].
    pub fn resolve(
        &mut self,
        document: RulesetDocument,
        base_dir: Option<&Path>,
        source: Option<PathBuf>,
    ) -> RulesetResult<Ruleset> {
        let mut ruleset = Ruleset {
            source,
            ..Default::default()
        };

        for entry in document.extends.into_vec() {
            let Some(parent_path) = local_reference(entry.reference(), base_dir) else {
                warn!(
                    "Skipping extends entry {:?}: only local ruleset files can be extended",
                    entry.reference()
                );
                continue;
            };
            let parent = self.load(&parent_path)?;
            ruleset.inherit(parent, entry.mode());
        }

        for function in document.functions {
            if !ruleset.functions.contains(&function) {
                ruleset.functions.push(function);
            }
        }

        for (name, entry) in document.rules {
            ruleset.apply_entry(name, entry);
        }

        for entry in document.overrides {
            let patterns = entry
                .files
                .iter()
                .map(|file| {
                    Pattern::new(file).map_err(|e| RulesetError::InvalidPattern {
                        pattern: file.clone(),
                        message: e.to_string(),
                    })
                })
                .collect::<RulesetResult<Vec<_>>>()?;

            ruleset.overrides.push(ResolvedOverride {
                base_dir: base_dir.map(Path::to_path_buf),
                patterns,
                rules: entry.rules,
            });
        }

        Ok(ruleset)
    }
}

/// Absolute, canonical form of a document path, so override globs match
/// however the path was spelled on the command line. Paths that do not
/// exist are cleaned up lexically.
pub fn normalize_document_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }

    let absolute = if path.is_relative() {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Turn an `extends` reference into a local path, if it is one.
fn local_reference(reference: &str, base_dir: Option<&Path>) -> Option<PathBuf> {
    if reference.contains("://") || reference.starts_with("spectral:") {
        return None;
    }

    let path = Path::new(reference);
    Some(match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const BASE: &str = r#"
functions: [ensureFields]
rules:
  info-fields:
    description: Info needs a title
    severity: error
    given: $.info
    then:
      function: ensureFields
      functionOptions:
        fields: [title]
  hidden:
    recommended: false
    given: $
    then:
      function: defined
"#;

    #[test]
    fn test_embedded_ruleset_parses() {
        let ruleset = Ruleset::embedded().unwrap();
        assert!(ruleset.source.is_none());
        assert!(ruleset.rules.contains_key("openapi-version"));
        assert!(ruleset.functions.contains(&"ensureValue".to_string()));
        assert!(ruleset.dangling.is_empty());
    }

    #[test]
    fn test_extends_merges_and_overrides_severity() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("base.yaml"), BASE).unwrap();
        fs::write(
            temp.path().join("child.yaml"),
            "extends: ./base.yaml\nrules:\n  info-fields: warn\n",
        )
        .unwrap();

        let ruleset = Ruleset::from_file(&temp.path().join("child.yaml")).unwrap();
        assert_eq!(ruleset.rules["info-fields"].severity, Severity::Warn);
        assert_eq!(ruleset.functions, vec!["ensureFields".to_string()]);
        assert_eq!(ruleset.effective_severity("hidden", None), None);
    }

    #[test]
    fn test_extends_modes() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("base.yaml"), BASE).unwrap();

        let document = RulesetDocument::from_yaml("extends: [[base.yaml, all]]").unwrap();
        let all = Ruleset::from_document(document, Some(temp.path())).unwrap();
        assert_eq!(all.effective_severity("hidden", None), Some(Severity::Warn));

        let document =
            RulesetDocument::from_yaml("extends: [[base.yaml, off]]\nrules:\n  hidden: true\n")
                .unwrap();
        let off = Ruleset::from_document(document, Some(temp.path())).unwrap();
        assert_eq!(off.effective_severity("info-fields", None), None);
        assert_eq!(off.effective_severity("hidden", None), Some(Severity::Warn));
    }

    #[test]
    fn test_extends_cycle_detected() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.yaml"), "extends: b.yaml\n").unwrap();
        fs::write(temp.path().join("b.yaml"), "extends: a.yaml\n").unwrap();

        let err = Ruleset::from_file(&temp.path().join("a.yaml")).unwrap_err();
        assert!(matches!(err, RulesetError::ExtendsCycle(_)));
    }

    #[test]
    fn test_remote_extends_skipped() {
        let document = RulesetDocument::from_yaml("extends: spectral:oas\n").unwrap();
        let ruleset = Ruleset::from_document(document, None).unwrap();
        assert!(ruleset.rules.is_empty());
    }

    #[test]
    fn test_missing_parent_is_an_error() {
        let temp = tempdir().unwrap();
        let document = RulesetDocument::from_yaml("extends: nope.yaml\n").unwrap();
        let err = Ruleset::from_document(document, Some(temp.path())).unwrap_err();
        assert!(matches!(err, RulesetError::NotFound(_)));
    }

    #[test]
    fn test_dangling_severity_entry() {
        let document = RulesetDocument::from_yaml("rules:\n  not-a-rule: off\n").unwrap();
        let ruleset = Ruleset::from_document(document, None).unwrap();
        assert_eq!(ruleset.dangling, vec!["not-a-rule".to_string()]);
    }

    #[test]
    fn test_overrides_match_relative_paths() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("rules.yaml"),
            format!(
                "{}overrides:\n  - files: [\"**/legacy/*.yaml\"]\n{}",
                BASE, "    rules:\n      info-fields: off\n"
            ),
        )
        .unwrap();

        let ruleset = Ruleset::from_file(&temp.path().join("rules.yaml")).unwrap();
        let base = fs::canonicalize(temp.path()).unwrap();

        let legacy = base.join("specs/legacy/pets.yaml");
        let current = base.join("specs/pets.yaml");
        assert_eq!(ruleset.effective_severity("info-fields", Some(&legacy)), None);
        assert_eq!(
            ruleset.effective_severity("info-fields", Some(&current)),
            Some(Severity::Error)
        );
    }

    #[test]
    fn test_overrides_match_unnormalized_paths() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("rules.yaml"),
            format!(
                "{}overrides:\n  - files: [\"legacy/*.yaml\"]\n{}",
                BASE, "    rules:\n      info-fields: off\n"
            ),
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("legacy")).unwrap();
        fs::write(temp.path().join("legacy/old.yaml"), "openapi: 3.0.0\n").unwrap();

        let ruleset = Ruleset::from_file(&temp.path().join("rules.yaml")).unwrap();

        let existing = temp.path().join("legacy/./../legacy/old.yaml");
        assert_eq!(ruleset.effective_severity("info-fields", Some(&existing)), None);

        let not_yet_written = temp.path().join("./legacy/new.yaml");
        let normalized = normalize_document_path(&not_yet_written);
        assert!(!normalized.components().any(|c| c == Component::CurDir));
        assert!(normalized.ends_with("legacy/new.yaml"));
    }

    #[test]
    fn test_invalid_override_pattern() {
        let document = RulesetDocument::from_yaml("overrides:\n  - files: [\"[\"]\n").unwrap();
        let err = Ruleset::from_document(document, None).unwrap_err();
        assert!(matches!(err, RulesetError::InvalidPattern { .. }));
    }
}
