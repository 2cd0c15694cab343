//! Function registry for resolving rule functions by name.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::ensure_examples::EnsureExamples;
use crate::ensure_fields::EnsureFields;
use crate::ensure_value::EnsureValue;
use crate::error::{FunctionError, FunctionResultOf};
use crate::function::RuleFunction;
use crate::pattern::Pattern;
use crate::schema::Schema;
use crate::truthy::{Defined, Truthy};

/// Functions every ruleset may use without declaring them in `functions`.
pub const CORE_FUNCTIONS: &[&str] = &["truthy", "defined", "pattern", "schema"];

/// A registry of rule function implementations.
///
/// Rulesets reference functions by name; the registry maps those names to
/// the implementation invoked for every matched fragment.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn RuleFunction>>,
}

impl FunctionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Create a registry holding every function shipped with this crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EnsureValue));
        registry.register(Arc::new(EnsureFields));
        registry.register(Arc::new(EnsureExamples));
        registry.register(Arc::new(Truthy));
        registry.register(Arc::new(Defined));
        registry.register(Arc::new(Pattern::new()));
        registry.register(Arc::new(Schema));
        registry
    }

    /// Register a function under its `name()`.
    ///
    /// If a function with the same name already exists, it will be replaced.
    pub fn register(&mut self, function: Arc<dyn RuleFunction>) {
        let name = function.name().to_string();
        debug!("Registering rule function: {}", name);
        self.functions.insert(name, function);
    }

    /// Register a function under a custom name.
    pub fn register_as(&mut self, name: impl Into<String>, function: Arc<dyn RuleFunction>) {
        let name = name.into();
        debug!("Registering rule function as: {}", name);
        self.functions.insert(name, function);
    }

    /// Get a function by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn RuleFunction>> {
        self.functions.get(name).cloned()
    }

    /// Get a function by name, returning an error if not found.
    pub fn get_required(&self, name: &str) -> FunctionResultOf<Arc<dyn RuleFunction>> {
        self.get(name)
            .ok_or_else(|| FunctionError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered function names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
