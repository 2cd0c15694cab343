//! `ensureFields`: a set of properties must be present.
//!
//! Options: `{ fields: [string], rejectEmpty?: bool }`.
//!
//! A field is missing when its key is absent from the object. With
//! `rejectEmpty: true`, keys holding `null`, `""`, `0`, `false`, `[]` or
//! `{}` are reported as missing as well.

use serde_json::Value;

use crate::function::{is_falsy, FunctionResult, RuleFunction};

pub const FIELDS_OPTION_MISSING: &str = "missing fields option";
pub const FIELDS_OPTION_NOT_ARRAY: &str = "fields option is not an array";
pub const FIELDS_OPTION_EMPTY: &str = "fields option is empty";
pub const FIELDS_OPTION_NOT_STRINGS: &str = "fields option must only contain strings";

/// Checks that every named field exists on the target object.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnsureFields;

impl RuleFunction for EnsureFields {
    fn name(&self) -> &str {
        "ensureFields"
    }

    fn call(&self, target: &Value, options: &Value) -> Vec<FunctionResult> {
        let Some(object) = target.as_object() else {
            return Vec::new();
        };

        let fields = match options.get("fields") {
            None | Some(Value::Null) => return vec![FunctionResult::new(FIELDS_OPTION_MISSING)],
            Some(Value::Array(fields)) => fields,
            Some(_) => return vec![FunctionResult::new(FIELDS_OPTION_NOT_ARRAY)],
        };

        if fields.is_empty() {
            return vec![FunctionResult::new(FIELDS_OPTION_EMPTY)];
        }

        let Some(names) = fields.iter().map(Value::as_str).collect::<Option<Vec<_>>>() else {
            return vec![FunctionResult::new(FIELDS_OPTION_NOT_STRINGS)];
        };

        let reject_empty = options
            .get("rejectEmpty")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let missing: Vec<&str> = names
            .into_iter()
            .filter(|name| match object.get(*name) {
                None => true,
                Some(value) => reject_empty && is_falsy(value),
            })
            .collect();

        if missing.is_empty() {
            Vec::new()
        } else {
            vec![FunctionResult::new(format!(
                "missing required fields: {}",
                missing.join(", ")
            ))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info_fields() -> Value {
        json!({"fields": ["title", "description"]})
    }

    #[test]
    fn test_all_fields_present() {
        let target = json!({"title": "x", "description": "y"});
        assert!(EnsureFields.call(&target, &info_fields()).is_empty());
    }

    #[test]
    fn test_lists_missing_field() {
        let results = EnsureFields.call(&json!({"title": "x"}), &info_fields());
        assert_eq!(results.len(), 1);
        assert!(results[0].message.contains("description"));
        assert!(!results[0].message.contains("title"));
    }

    #[test]
    fn test_joins_all_missing_fields_in_option_order() {
        let results = EnsureFields.call(
            &json!({}),
            &json!({"fields": ["title", "version", "description"]}),
        );
        assert_eq!(
            results,
            vec![FunctionResult::new("missing required fields: title, version, description")]
        );
    }

    #[test]
    fn test_option_validation_order() {
        let target = json!({"title": "x"});
        assert_eq!(EnsureFields.call(&target, &json!({}))[0].message, FIELDS_OPTION_MISSING);
        assert_eq!(
            EnsureFields.call(&target, &json!({"fields": "title"}))[0].message,
            FIELDS_OPTION_NOT_ARRAY
        );
        assert_eq!(
            EnsureFields.call(&target, &json!({"fields": []}))[0].message,
            FIELDS_OPTION_EMPTY
        );
        assert_eq!(
            EnsureFields.call(&target, &json!({"fields": ["title", 3]}))[0].message,
            FIELDS_OPTION_NOT_STRINGS
        );
    }

    #[test]
    fn test_empty_values_count_as_present_by_default() {
        let target = json!({"title": "", "description": null});
        assert!(EnsureFields.call(&target, &info_fields()).is_empty());
    }

    #[test]
    fn test_reject_empty_treats_falsy_values_as_missing() {
        let target = json!({"title": "", "description": "y"});
        let options = json!({"fields": ["title", "description"], "rejectEmpty": true});
        let results = EnsureFields.call(&target, &options);
        assert_eq!(results, vec![FunctionResult::new("missing required fields: title")]);
    }

    #[test]
    fn test_non_object_passes() {
        assert!(EnsureFields.call(&json!("info"), &json!({"fields": []})).is_empty());
        assert!(EnsureFields.call(&json!(null), &json!({})).is_empty());
    }
}
