//! Presence checks: `truthy` and `defined`.

use serde_json::Value;

use crate::function::{FunctionResult, RuleFunction};

/// Fails on missing, `null`, `false`, `0` and `""` values. Arrays and
/// objects are truthy even when empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct Truthy;

impl RuleFunction for Truthy {
    fn name(&self) -> &str {
        "truthy"
    }

    fn call(&self, target: &Value, _options: &Value) -> Vec<FunctionResult> {
        if !is_truthy(target) {
            vec![FunctionResult::new("value must be truthy")]
        } else {
            Vec::new()
        }
    }

    fn call_missing(&self, _options: &Value) -> Vec<FunctionResult> {
        vec![FunctionResult::new("value must be truthy")]
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Fails only when the targeted property does not exist.
#[derive(Debug, Default, Clone, Copy)]
pub struct Defined;

impl RuleFunction for Defined {
    fn name(&self) -> &str {
        "defined"
    }

    fn call(&self, _target: &Value, _options: &Value) -> Vec<FunctionResult> {
        Vec::new()
    }

    fn call_missing(&self, _options: &Value) -> Vec<FunctionResult> {
        vec![FunctionResult::new("value must be defined")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy() {
        assert!(Truthy.call(&json!("Pets API"), &json!({})).is_empty());
        assert_eq!(Truthy.call(&json!(""), &json!({})).len(), 1);
        assert_eq!(Truthy.call_missing(&json!({})).len(), 1);
    }

    #[test]
    fn test_truthy_accepts_empty_collections() {
        assert!(Truthy.call(&json!([]), &json!({})).is_empty());
        assert!(Truthy.call(&json!({}), &json!({})).is_empty());
        assert_eq!(Truthy.call(&json!(0), &json!({})).len(), 1);
        assert_eq!(Truthy.call(&json!(false), &json!({})).len(), 1);
        assert_eq!(Truthy.call(&json!(null), &json!({})).len(), 1);
    }

    #[test]
    fn test_defined_accepts_null() {
        assert!(Defined.call(&json!(null), &json!({})).is_empty());
        assert_eq!(Defined.call_missing(&json!({})).len(), 1);
    }
}
