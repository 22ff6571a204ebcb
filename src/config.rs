//! Import configuration
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no file
//! at all) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings shared by the parser, the file intake and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Separates a wiki-link's title from its display alias: `[[Title|Alias]]`
    #[serde(default = "default_alias_divider")]
    pub alias_divider: char,

    /// File extensions accepted by the intake, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Owner used when the CLI is not given one
    #[serde(default)]
    pub default_owner: Option<String>,
}

fn default_alias_divider() -> char {
    '|'
}

fn default_extensions() -> Vec<String> {
    ["text", "txt", "md", "mkdn", "mdwn", "mdown", "markdown"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            alias_divider: default_alias_divider(),
            extensions: default_extensions(),
            default_owner: None,
        }
    }
}

impl ImportConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ImportConfig = if yaml.trim().is_empty() {
            ImportConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.alias_divider, '[' | ']') || self.alias_divider.is_whitespace() {
            return Err(ConfigError::Invalid(format!(
                "alias_divider cannot be {:?}",
                self.alias_divider
            )));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "extensions must list at least one extension".into(),
            ));
        }
        Ok(())
    }

    /// Whether a file name carries one of the accepted extensions
    /// (case-insensitive)
    pub fn accepts(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => self
                .extensions
                .iter()
                .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}
