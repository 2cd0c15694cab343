//! Ruleset validation.

use std::collections::BTreeSet;

use cx_functions::{FunctionRegistry, CORE_FUNCTIONS};

use crate::ruleset::Ruleset;
use crate::selector::Selector;

/// Validation result with details.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Validator for resolved rulesets.
pub struct RulesetValidator;

impl RulesetValidator {
    /// Validate a ruleset against the functions available to run it.
    pub fn validate(ruleset: &Ruleset, registry: &FunctionRegistry) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.merge(Self::validate_declared_functions(ruleset, registry));
        result.merge(Self::validate_rules(ruleset, registry));

        for name in &ruleset.dangling {
            result.add_error(format!("Rule '{}' is configured but never defined", name));
        }

        result
    }

    /// Every name in `functions` must be registered, and should be used.
    pub fn validate_declared_functions(
        ruleset: &Ruleset,
        registry: &FunctionRegistry,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        let used: BTreeSet<&str> = ruleset.rules.values().flat_map(|r| r.functions()).collect();

        for name in &ruleset.functions {
            if !registry.contains(name) {
                result.add_error(format!("Declared function '{}' is not registered", name));
            } else if !used.contains(name.as_str()) {
                result.add_warning(format!("Declared function '{}' is not used by any rule", name));
            }
        }

        result
    }

    /// Every rule must reference registered functions and parse its selectors.
    pub fn validate_rules(ruleset: &Ruleset, registry: &FunctionRegistry) -> ValidationResult {
        let mut result = ValidationResult::new();

        for (name, rule) in &ruleset.rules {
            if rule.given.as_slice().is_empty() {
                result.add_error(format!("Rule '{}' has no given selector", name));
            }

            for given in rule.given.as_slice() {
                if let Err(e) = Selector::parse(given) {
                    result.add_error(format!("Rule '{}' has an invalid selector: {}", name, e));
                }
            }

            if rule.then.as_slice().is_empty() {
                result.add_error(format!("Rule '{}' has no then clause", name));
            }

            for function in rule.functions() {
                if !registry.contains(function) {
                    result.add_error(format!(
                        "Rule '{}' references unknown function '{}'",
                        name, function
                    ));
                } else if !CORE_FUNCTIONS.contains(&function)
                    && !ruleset.functions.iter().any(|f| f == function)
                {
                    result.add_warning(format!(
                        "Rule '{}' uses function '{}' without declaring it in functions",
                        name, function
                    ));
                }
            }

            if rule.description.as_deref().map_or(true, str::is_empty) {
                result.add_warning(format!("Rule '{}' has no description", name));
            }
        }

        result
    }
}
