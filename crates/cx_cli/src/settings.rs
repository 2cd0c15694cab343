//! Project configuration (`lifecycle/lifecycle_config.yaml`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Where the project config lives, relative to the project root.
pub const DEFAULT_CONFIG_PATH: &str = "lifecycle/lifecycle_config.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid config file {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("Config file {0} does not set core_services.openAPI")]
    MissingOpenApi(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Services section of the project config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoreServices {
    /// Directory holding the project's OpenAPI documents
    #[serde(rename = "openAPI", default, skip_serializing_if = "Option::is_none")]
    pub open_api: Option<PathBuf>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The parts of the lifecycle config this tool reads; everything else is
/// kept in `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub core_services: CoreServices,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        debug!("Reading project config from {:?}", path);
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The OpenAPI directory, resolved against `project_root` when relative.
    pub fn openapi_dir(
        &self,
        config_path: &Path,
        project_root: &Path,
    ) -> Result<PathBuf, ConfigError> {
        let dir = self
            .core_services
            .open_api
            .as_deref()
            .ok_or_else(|| ConfigError::MissingOpenApi(config_path.to_path_buf()))?;

        Ok(if dir.is_relative() {
            project_root.join(dir)
        } else {
            dir.to_path_buf()
        })
    }
}
