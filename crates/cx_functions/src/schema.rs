//! `schema`: validate a fragment against an inline JSON Schema.
//!
//! Options: `{ schema: object }`.

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::function::{FunctionResult, RuleFunction};

#[derive(Debug, Default, Clone, Copy)]
pub struct Schema;

impl RuleFunction for Schema {
    fn name(&self) -> &str {
        "schema"
    }

    fn call(&self, target: &Value, options: &Value) -> Vec<FunctionResult> {
        let Some(schema) = options.get("schema") else {
            return vec![FunctionResult::new("schema option is missing")];
        };

        let compiled = match JSONSchema::compile(schema) {
            Ok(compiled) => compiled,
            Err(e) => {
                return vec![FunctionResult::new(format!("schema option is invalid: {}", e))];
            }
        };

        let results = match compiled.validate(target) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| {
                    let location = error.instance_path.to_string();
                    if location.is_empty() {
                        FunctionResult::new(error.to_string())
                    } else {
                        FunctionResult::new(format!("{}: {}", location, error))
                    }
                })
                .collect(),
        };
        results
    }
}
