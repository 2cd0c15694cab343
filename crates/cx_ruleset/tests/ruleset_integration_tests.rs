//! Integration tests for rulesets and the linter.

use std::fs;
use tempfile::tempdir;

use cx_functions::FunctionRegistry;
use cx_ruleset::{Document, DocumentFormat, Linter, Ruleset, RulesetError, Severity};

const PETSTORE: &str = r#"
openapi: 3.1.0
info:
  title: Petstore
  description: Pets for sale
  version: 1.0.0
  contact:
    name: Pet team
servers:
  - url: https://pets.example.com
tags:
  - name: pets
paths:
  /pets:
    get:
      operationId: listPets
      summary: List all pets
      tags: [pets]
      responses:
        200:
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
              example: []
    post:
      operationId: createPet
      summary: Create a pet
      tags: [pets]
      responses:
        201:
          description: Created
          content:
            application/json:
              schema:
                type: object
                example: {name: Rex}
"#;

fn petstore() -> Document {
    Document::from_str_with_format(PETSTORE, DocumentFormat::Yaml).unwrap()
}

/// A complete 3.1.0 document passes the built-in ruleset.
#[test]
fn test_clean_petstore_passes() {
    let linter = Linter::with_defaults().unwrap();
    let report = linter.lint(&petstore());
    assert!(report.is_clean(), "Unexpected diagnostics: {:?}", report.diagnostics);
}

/// Each broken property yields a diagnostic from the matching rule.
#[test]
fn test_broken_document_reports_every_rule() {
    let linter = Linter::with_defaults().unwrap();
    let yaml = PETSTORE
        .replace("openapi: 3.1.0", "openapi: 3.0.3")
        .replace("  description: Pets for sale\n", "")
        .replace("operationId: listPets", "operationId: ListPets")
        .replace("              example: []\n", "");
    let report = linter.lint(&Document::from_str_with_format(&yaml, DocumentFormat::Yaml).unwrap());

    let codes: Vec<&str> = report.diagnostics.iter().map(|d| d.code.as_str()).collect();
    assert!(codes.contains(&"openapi-version"));
    assert!(codes.contains(&"info-fields"));
    assert!(codes.contains(&"operation-id-casing"));
    assert!(codes.contains(&"response-examples"));

    let info = report.for_rule("info-fields").next().unwrap();
    assert_eq!(info.message, "info object: missing required fields: description");
    assert!(report.has_failures(Severity::Error));
}

/// Linting twice yields identical reports.
#[test]
fn test_lint_is_idempotent() {
    let linter = Linter::with_defaults().unwrap();
    let document = Document::from_str_with_format(
        "openapi: 3.0.0\npaths:\n  /a:\n    get: {}\n",
        DocumentFormat::Yaml,
    )
    .unwrap();
    assert_eq!(linter.lint(&document), linter.lint(&document));
}

/// A project ruleset extends another file and relaxes rules per path.
#[test]
fn test_extends_and_overrides_from_files() {
    let temp = tempdir().unwrap();
    let root = fs::canonicalize(temp.path()).unwrap();

    fs::write(
        root.join("base.yaml"),
        r#"
functions: [ensureValue]
rules:
  openapi-version:
    description: Version must be 3.1.0
    severity: error
    given: $
    then:
      function: ensureValue
      functionOptions: {field: openapi, value: 3.1.0}
"#,
    )
    .unwrap();
    fs::write(
        root.join("project.yaml"),
        r#"
extends: [[./base.yaml, all]]
overrides:
  - files: ["legacy/*.yaml"]
    rules:
      openapi-version: warn
"#,
    )
    .unwrap();

    let ruleset = Ruleset::from_file(&root.join("project.yaml")).unwrap();
    let linter = Linter::new(ruleset, FunctionRegistry::with_builtins()).unwrap();

    fs::create_dir_all(root.join("legacy")).unwrap();
    let legacy_path = root.join("legacy/old.yaml");
    fs::write(&legacy_path, "openapi: 3.0.0\n").unwrap();
    let current_path = root.join("current.yaml");
    fs::write(&current_path, "openapi: 3.0.0\n").unwrap();

    let legacy = linter.lint(&Document::from_path(&legacy_path).unwrap());
    assert_eq!(legacy.diagnostics.len(), 1);
    assert_eq!(legacy.diagnostics[0].severity, Severity::Warn);

    let current = linter.lint(&Document::from_path(&current_path).unwrap());
    assert_eq!(current.diagnostics[0].severity, Severity::Error);
    assert_eq!(current.source.as_deref(), Some(current_path.as_path()));
}

/// Rules that reference unregistered functions never reach the runner.
#[test]
fn test_unknown_function_rejected_on_load() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("rules.yaml");
    fs::write(
        &path,
        concat!(
            "rules:\n  tags:\n    description: x\n    given: $\n",
            "    then:\n      function: ensureTags\n",
        ),
    )
    .unwrap();

    let ruleset = Ruleset::from_file(&path).unwrap();
    let err = Linter::new(ruleset, FunctionRegistry::with_builtins()).err().unwrap();
    assert!(matches!(err, RulesetError::ValidationFailed(_)));
}

/// A missing ruleset file is reported as not found.
#[test]
fn test_missing_ruleset_file() {
    let temp = tempdir().unwrap();
    let err = Ruleset::from_file(&temp.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, RulesetError::NotFound(_)));
}
