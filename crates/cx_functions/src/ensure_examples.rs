//! `ensureExamples`: a media type object must carry an example.
//!
//! Options: `{ allowSchemaExamples?: bool }` (defaults to `true`).

use serde_json::Value;

use crate::function::{FunctionResult, RuleFunction};

pub const NO_EXAMPLE: &str = "media type object has no example";

/// Checks that an OpenAPI media type object documents at least one example.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnsureExamples;

fn has_examples(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        _ => false,
    }
}

impl RuleFunction for EnsureExamples {
    fn name(&self) -> &str {
        "ensureExamples"
    }

    fn call(&self, target: &Value, options: &Value) -> Vec<FunctionResult> {
        let Some(media_type) = target.as_object() else {
            return Vec::new();
        };

        if media_type.contains_key("example") || has_examples(media_type.get("examples")) {
            return Vec::new();
        }

        let allow_schema = options
            .get("allowSchemaExamples")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        if allow_schema {
            if let Some(schema) = media_type.get("schema").and_then(Value::as_object) {
                if schema.contains_key("example") || has_examples(schema.get("examples")) {
                    return Vec::new();
                }
            }
        }

        vec![FunctionResult::new(NO_EXAMPLE)]
    }
}
