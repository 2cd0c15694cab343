//! `ensureValue`: a property must equal a fixed value.
//!
//! Options: `{ field: string, value: any }`.

use serde_json::Value;

use crate::function::{render, FunctionResult, RuleFunction};

pub const FIELD_OPTION_MISSING: &str = "field option is missing";
pub const VALUE_OPTION_MISSING: &str = "value option is missing";

/// Checks that `target[field] == value`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnsureValue;

impl RuleFunction for EnsureValue {
    fn name(&self) -> &str {
        "ensureValue"
    }

    fn call(&self, target: &Value, options: &Value) -> Vec<FunctionResult> {
        let Some(object) = target.as_object() else {
            return Vec::new();
        };

        let Some(field) = options.get("field").and_then(Value::as_str) else {
            return vec![FunctionResult::new(FIELD_OPTION_MISSING)];
        };

        let Some(expected) = options.get("value") else {
            return vec![FunctionResult::new(VALUE_OPTION_MISSING)];
        };

        match object.get(field) {
            Some(actual) if actual == expected => Vec::new(),
            Some(actual) => vec![FunctionResult::new(format!(
                "field \"{}\" is {}, expected {}",
                field,
                render(actual),
                render(expected)
            ))],
            None => vec![FunctionResult::new(format!(
                "field \"{}\" is missing, expected {}",
                field,
                render(expected)
            ))],
        }
    }
}
