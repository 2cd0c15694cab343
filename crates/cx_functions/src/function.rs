//! The rule function contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single problem reported by a rule function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub message: String,
}

impl FunctionResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A named, stateless check applied to one document fragment.
///
/// Implementations must be pure: the same `(target, options)` pair always
/// yields the same results, and calls may happen in any order from any
/// thread. An empty vector means the fragment passed.
pub trait RuleFunction: Send + Sync {
    /// Name the function is registered and referenced under.
    fn name(&self) -> &str;

    /// Evaluate the function against a fragment that exists.
    fn call(&self, target: &Value, options: &Value) -> Vec<FunctionResult>;

    /// Evaluate the function when the targeted property is absent.
    ///
    /// Only reached when a rule narrows its match with `then.field` and the
    /// field does not exist. Most functions have nothing to check.
    fn call_missing(&self, _options: &Value) -> Vec<FunctionResult> {
        Vec::new()
    }
}

/// Render a JSON value for use inside a finding message.
pub(crate) fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Whether a value counts as empty for falsy-style checks.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_quotes_strings() {
        assert_eq!(render(&json!("3.1.0")), "\"3.1.0\"");
        assert_eq!(render(&json!(3)), "3");
    }

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!("")));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!(false)));
        assert!(!is_falsy(&json!("x")));
        assert!(!is_falsy(&json!(1.5)));
    }
}
