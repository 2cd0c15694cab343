//! Runs a resolved ruleset against documents.

use std::sync::Arc;

use cx_functions::{FunctionRegistry, FunctionResult, RuleFunction};
use serde_json::Value;
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{RulesetError, RulesetResult};
use crate::report::{Diagnostic, LintReport};
use crate::rule::Rule;
use crate::ruleset::Ruleset;
use crate::selector::{DocumentPath, PathSegment, Selector};
use crate::validator::RulesetValidator;

const DEFAULT_MESSAGE: &str = "{{error}}";
const KEY_FIELD: &str = "@key";

struct CompiledThen {
    field: Option<String>,
    function: Arc<dyn RuleFunction>,
    options: Value,
}

struct CompiledRule {
    name: String,
    selectors: Vec<Selector>,
    thens: Vec<CompiledThen>,
}

/// A ruleset bound to the functions that implement it.
///
/// Construction validates the ruleset and compiles every selector once, so
/// a `Linter` can be shared across threads and reused for many documents.
pub struct Linter {
    ruleset: Ruleset,
    registry: FunctionRegistry,
    compiled: Vec<CompiledRule>,
}

impl Linter {
    pub fn new(ruleset: Ruleset, registry: FunctionRegistry) -> RulesetResult<Self> {
        let validation = RulesetValidator::validate(&ruleset, &registry);
        for warning in &validation.warnings {
            warn!("{}", warning);
        }
        if !validation.valid {
            return Err(RulesetError::ValidationFailed(validation.errors.join("; ")));
        }

        let mut compiled = Vec::with_capacity(ruleset.rules.len());
        for (name, rule) in &ruleset.rules {
            compiled.push(compile(name, rule, &registry)?);
        }

        debug!("Compiled {} rules", compiled.len());
        Ok(Self {
            ruleset,
            registry,
            compiled,
        })
    }

    /// Linter for the embedded ruleset and built-in functions.
    pub fn with_defaults() -> RulesetResult<Self> {
        Self::new(Ruleset::embedded()?, FunctionRegistry::with_builtins())
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Lint one document. Diagnostics are sorted by path, then rule.
    pub fn lint(&self, document: &Document) -> LintReport {
        let source = document.source.as_deref();
        let mut diagnostics = Vec::new();

        for compiled in &self.compiled {
            let Some(severity) = self.ruleset.effective_severity(&compiled.name, source) else {
                continue;
            };
            let Some(rule) = self.ruleset.rules.get(&compiled.name) else {
                continue;
            };

            for selector in &compiled.selectors {
                for (path, value) in selector.select(&document.content) {
                    for then in &compiled.thens {
                        let (target_path, results) = evaluate(then, &path, value);
                        for result in results {
                            diagnostics.push(Diagnostic {
                                code: compiled.name.clone(),
                                message: render_message(rule, &result, &target_path),
                                severity,
                                path: target_path.clone(),
                                source: document.source.clone(),
                            });
                        }
                    }
                }
            }
        }

        diagnostics.sort_by(|a, b| {
            (&a.path, &a.code, &a.message).cmp(&(&b.path, &b.code, &b.message))
        });
        diagnostics.dedup();

        debug!(
            "Linted {:?}: {} diagnostics",
            document.source,
            diagnostics.len()
        );

        LintReport {
            source: document.source.clone(),
            diagnostics,
        }
    }
}

fn compile(name: &str, rule: &Rule, registry: &FunctionRegistry) -> RulesetResult<CompiledRule> {
    let selectors = rule
        .given
        .as_slice()
        .iter()
        .map(|given| Selector::parse(given))
        .collect::<Result<Vec<_>, _>>()?;

    let thens = rule
        .then
        .as_slice()
        .iter()
        .map(|then| {
            let function = registry
                .get_required(&then.function)
                .map_err(|e| RulesetError::ValidationFailed(e.to_string()))?;
            Ok(CompiledThen {
                field: then.field.clone(),
                function,
                options: then.function_options.clone(),
            })
        })
        .collect::<RulesetResult<Vec<_>>>()?;

    Ok(CompiledRule {
        name: name.to_string(),
        selectors,
        thens,
    })
}

/// Invoke a `then` on a matched fragment, resolving `field` first.
fn evaluate(
    then: &CompiledThen,
    path: &DocumentPath,
    value: &Value,
) -> (DocumentPath, Vec<FunctionResult>) {
    let Some(field) = then.field.as_deref() else {
        return (path.clone(), then.function.call(value, &then.options));
    };

    if field == KEY_FIELD {
        let key = match path.segments().last() {
            Some(segment) => Value::String(segment.to_string()),
            None => return (path.clone(), then.function.call_missing(&then.options)),
        };
        return (path.clone(), then.function.call(&key, &then.options));
    }

    let mut target_path = path.clone();
    let mut current = Some(value);
    for key in field.split('.') {
        target_path = target_path.child(PathSegment::Key(key.to_string()));
        current = current.and_then(|v| v.as_object()).and_then(|map| map.get(key));
    }

    let results = match current {
        Some(target) => then.function.call(target, &then.options),
        None => then.function.call_missing(&then.options),
    };
    (target_path, results)
}

fn render_message(rule: &Rule, result: &FunctionResult, path: &DocumentPath) -> String {
    let template = rule.message.as_deref().unwrap_or(DEFAULT_MESSAGE);
    let rendered = template
        .replace("{{error}}", &result.message)
        .replace("{{description}}", rule.description.as_deref().unwrap_or_default())
        .replace("{{path}}", &path.to_string())
        .replace("{{property}}", path.property().unwrap_or_default());

    if rendered.trim().is_empty() {
        result.message.clone()
    } else {
        rendered
    }
}
