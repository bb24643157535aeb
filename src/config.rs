// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};

pub const DEFAULT_APP_NAME: &str = "LocalTest";
pub const DEFAULT_TABLE_PATH: &str = "/tmp/delta_spark_test";

/// Settings for one smoke run.
///
/// `settings` are passed verbatim to the engine as `key = value` options, so a
/// misspelt key fails at session start with the engine's own error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeConfig {
    pub app_name: String,
    pub table_path: PathBuf,
    pub settings: BTreeMap<String, String>,
    /// Register the Delta table factory with the session.
    pub delta_extensions: bool,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        let mut settings = BTreeMap::new();
        settings.insert(
            "datafusion.catalog.information_schema".to_string(),
            "true".to_string(),
        );
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            settings,
            delta_extensions: true,
        }
    }
}

impl SmokeConfig {
    /// Parse a YAML document; absent fields keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing smoke config YAML")
    }

    /// Load a YAML config file from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Same config pointed at another table location.
    pub fn with_table_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.table_path = path.into();
        self
    }
}
