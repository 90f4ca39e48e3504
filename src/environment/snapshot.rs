//! Fixed environment snapshots.
//!
//! A snapshot describes an environment declaratively, which makes audits
//! reproducible and lets tests stand in for live process state:
//!
//! ```yaml
//! server: nginx/1.25
//! extensions:
//!   pdo: "7.4.3"
//!   intl: PECL-3.0.0
//! ini:
//!   post_max_size: 8M
//!   upload_max_filesize: 2M
//!   display_errors: off
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::EnvironmentReader;
use crate::error::{AuditError, Result};

/// An environment described by fixed values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaticEnvironment {
    /// Loaded extensions and their reported versions. An empty version
    /// means the extension is loaded but reports none.
    #[serde(deserialize_with = "scalar_map")]
    pub extensions: HashMap<String, String>,

    /// Configuration option values.
    #[serde(deserialize_with = "scalar_map")]
    pub ini: HashMap<String, String>,

    /// Server description for report footers.
    pub server: Option<String>,
}

impl StaticEnvironment {
    /// Create an empty environment: nothing loaded, every option unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a loaded extension with its reported version.
    pub fn with_extension(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.extensions.insert(name.into(), version.into());
        self
    }

    /// Set a configuration option.
    pub fn with_ini(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.ini.insert(name.into(), value.into());
        self
    }

    /// Set the server description.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Parse a snapshot from YAML text.
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document is an empty environment.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load a snapshot from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let env = Self::from_yaml_str(&content).map_err(|e| AuditError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(
            "Loaded environment snapshot from {} ({} extensions, {} options)",
            path.display(),
            env.extensions.len(),
            env.ini.len()
        );
        Ok(env)
    }
}

impl EnvironmentReader for StaticEnvironment {
    fn is_extension_loaded(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    fn extension_version(&self, name: &str) -> Option<String> {
        self.extensions.get(name).cloned()
    }

    fn ini_value(&self, name: &str) -> Option<String> {
        self.ini.get(name).cloned()
    }

    fn server_info(&self) -> String {
        self.server.clone().unwrap_or_default()
    }
}

/// Deserialize a map whose values may be any YAML scalar.
///
/// Booleans follow ini conventions: `true` becomes `"1"`, `false` and null
/// become the empty string.
fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<HashMap<String, serde_yaml::Value>> = Option::deserialize(deserializer)?;
    let mut map = HashMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let text = match value {
            serde_yaml::Value::Null => String::new(),
            serde_yaml::Value::Bool(true) => "1".to_string(),
            serde_yaml::Value::Bool(false) => String::new(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::String(s) => s,
            other => {
                return Err(D::Error::custom(format!(
                    "value for '{}' must be a scalar, got {:?}",
                    key, other
                )))
            }
        };
        map.insert(key, text);
    }
    Ok(map)
}
