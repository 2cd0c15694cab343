//! # cx_functions
//!
//! Rule functions used by the cx-lifecycle OpenAPI ruleset.
//!
//! A rule function is a pure check evaluated once per document fragment
//! matched by a rule's selector. It receives the fragment and the rule's
//! static options and returns zero or more [`FunctionResult`]s. An empty
//! result means the fragment passed.
//!
//! This crate provides:
//! - **Custom functions**: `ensureValue`, `ensureFields`, `ensureExamples`
//! - **Core functions**: `truthy`, `defined`, `pattern`, `schema`
//! - **Registry**: name-based lookup used by rulesets
//!
//! ## Example
//!
//! ```rust
//! use cx_functions::FunctionRegistry;
//! use serde_json::json;
//!
//! let registry = FunctionRegistry::with_builtins();
//! let ensure_value = registry.get("ensureValue").unwrap();
//!
//! let results = ensure_value.call(
//!     &json!({"openapi": "3.0.0"}),
//!     &json!({"field": "openapi", "value": "3.1.0"}),
//! );
//! assert_eq!(results.len(), 1);
//! ```

pub mod ensure_examples;
pub mod ensure_fields;
pub mod ensure_value;
pub mod error;
pub mod function;
pub mod pattern;
pub mod registry;
pub mod schema;
pub mod truthy;

pub use ensure_examples::EnsureExamples;
pub use ensure_fields::EnsureFields;
pub use ensure_value::EnsureValue;
pub use error::{FunctionError, FunctionResultOf};
pub use function::{FunctionResult, RuleFunction};
pub use pattern::Pattern;
pub use registry::{FunctionRegistry, CORE_FUNCTIONS};
pub use schema::Schema;
pub use truthy::{Defined, Truthy};
