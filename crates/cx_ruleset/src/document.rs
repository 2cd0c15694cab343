//! Documents to lint.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{RulesetError, RulesetResult};

/// Source format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// A parsed document, ready for selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: Option<PathBuf>,
    pub content: Value,
}

impl Document {
    pub fn new(content: Value) -> Self {
        Self {
            source: None,
            content,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Read and parse a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: &Path) -> RulesetResult<Self> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| RulesetError::UnsupportedDocument(path.to_path_buf()))?;
        debug!("Reading document from {:?}", path);
        let text = fs::read_to_string(path)?;
        Self::parse(&text, format, Some(path.to_path_buf()))
    }

    /// Parse document text in a known format.
    pub fn parse(
        text: &str,
        format: DocumentFormat,
        source: Option<PathBuf>,
    ) -> RulesetResult<Self> {
        let invalid = |message: String| RulesetError::InvalidDocument {
            path: source.clone().unwrap_or_default(),
            message,
        };

        let content = match format {
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?
            }
            DocumentFormat::Yaml => {
                let mut yaml: serde_yaml::Value =
                    serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))?;
                // `<<: *anchor` merge keys
                yaml.apply_merge().map_err(|e| invalid(e.to_string()))?;
                yaml_to_json(yaml).map_err(invalid)?
            }
        };

        Ok(Self { source, content })
    }

    /// Parse an in-memory string; used mostly by tests.
    pub fn from_str_with_format(text: &str, format: DocumentFormat) -> RulesetResult<Self> {
        Self::parse(text, format, None)
    }
}

/// Convert YAML into JSON, stringifying scalar keys such as `200:`.
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("unsupported number: {}", n))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Null => "null".to_string(),
                    other => return Err(format!("unsupported mapping key: {:?}", other)),
                };
                map.insert(key, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_yaml_status_codes_become_string_keys() {
        let doc = Document::from_str_with_format(
            "responses:\n  200:\n    description: ok\n  default:\n    description: err\n",
            DocumentFormat::Yaml,
        )
        .unwrap();

        assert_eq!(doc.content["responses"]["200"], json!({"description": "ok"}));
        assert!(doc.content["responses"].get("default").is_some());
    }

    #[test]
    fn test_yaml_merge_keys_are_resolved() {
        let doc = Document::from_str_with_format(
            "base: &base\n  title: Pets\ninfo:\n  <<: *base\n  version: '1'\n",
            DocumentFormat::Yaml,
        )
        .unwrap();

        assert_eq!(doc.content["info"], json!({"title": "Pets", "version": "1"}));
    }

    #[test]
    fn test_yaml_version_stays_a_string() {
        let doc =
            Document::from_str_with_format("openapi: 3.1.0\n", DocumentFormat::Yaml).unwrap();
        assert_eq!(doc.content["openapi"], json!("3.1.0"));
    }

    #[test]
    fn test_from_path_detects_format() {
        let temp = tempdir().unwrap();
        let json_path = temp.path().join("pets.JSON");
        fs::write(&json_path, r#"{"openapi": "3.1.0"}"#).unwrap();

        let doc = Document::from_path(&json_path).unwrap();
        assert_eq!(doc.source.as_deref(), Some(json_path.as_path()));
        assert_eq!(doc.content["openapi"], json!("3.1.0"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Document::from_path(Path::new("pets.txt")).unwrap_err();
        assert!(matches!(err, RulesetError::UnsupportedDocument(_)));
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{").unwrap();

        match Document::from_path(&path).unwrap_err() {
            RulesetError::InvalidDocument { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
