//! `pattern`: regular expression checks on string values.
//!
//! Options: `{ match?: regex, notMatch?: regex }`. Non-string targets pass.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::function::{FunctionResult, RuleFunction};

/// Compiled expressions are cached by source, so each pattern in a
/// ruleset is compiled once however many fragments it checks.
#[derive(Debug, Default)]
pub struct Pattern {
    cache: Mutex<HashMap<String, Result<Regex, String>>>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    fn compile(&self, option: &str, source: &str) -> Result<Regex, FunctionResult> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let compiled = cache
            .entry(source.to_string())
            .or_insert_with(|| Regex::new(source).map_err(|e| e.to_string()))
            .clone();

        compiled.map_err(|e| {
            debug!("Invalid {} pattern {:?}: {}", option, source, e);
            FunctionResult::new(format!("{} option is not a valid regex: {}", option, e))
        })
    }

    #[cfg(test)]
    fn cached(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or_default()
    }
}

impl RuleFunction for Pattern {
    fn name(&self) -> &str {
        "pattern"
    }

    fn call(&self, target: &Value, options: &Value) -> Vec<FunctionResult> {
        let must_match = options.get("match").and_then(Value::as_str);
        let must_not_match = options.get("notMatch").and_then(Value::as_str);

        if must_match.is_none() && must_not_match.is_none() {
            return vec![FunctionResult::new("pattern option requires match or notMatch")];
        }

        let Some(text) = target.as_str() else {
            return Vec::new();
        };

        let mut results = Vec::new();

        if let Some(source) = must_match {
            match self.compile("match", source) {
                Ok(re) if !re.is_match(text) => results.push(FunctionResult::new(format!(
                    "\"{}\" must match the pattern \"{}\"",
                    text, source
                ))),
                Ok(_) => {}
                Err(result) => results.push(result),
            }
        }

        if let Some(source) = must_not_match {
            match self.compile("notMatch", source) {
                Ok(re) if re.is_match(text) => results.push(FunctionResult::new(format!(
                    "\"{}\" must not match the pattern \"{}\"",
                    text, source
                ))),
                Ok(_) => {}
                Err(result) => results.push(result),
            }
        }

        results
    }
}
