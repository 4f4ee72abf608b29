//! Layering and categorization configuration for strata.
//!
//! A composer configuration names the layers to compose (each with
//! include/exclude reference lists) and the categorization rules that define
//! the global precedence order:
//!
//! ```toml
//! version = 1
//!
//! [[layering]]
//! name = "site"
//! include = ["confdir-hiera:/hiera.toml?", "confdir:/default?"]
//!
//! [[layering]]
//! name = "modules"
//! # A single string is accepted wherever a list is.
//! include = "module:/*/default"
//! exclude = ["module:/legacy/default"]
//!
//! [[categorization]]
//! name = "node"
//! expression = "name"
//!
//! [[categorization]]
//! name = "osfamily"
//! expression = "facts.osfamily | 'unknown'"
//! ```
//!
//! Categorization entries are declared most-specific first; their order is
//! the global precedence order the precedence checker validates against.
//! Validation here is structural (names, duplicates, empty entries) —
//! expressions are compiled by the engine when a composer is built.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// The root composer configuration, normally loaded from `compose.toml`
/// in the confdir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Config format version. Only version 1 exists.
    #[serde(default = "default_version")]
    pub version: u32,

    /// The layers to compose, in declared (highest precedence first) order.
    #[serde(default)]
    pub layering: Vec<LayerSpec>,

    /// The precedence categories, most specific first.
    #[serde(default)]
    pub categorization: Vec<CategorySpec>,
}

fn default_version() -> u32 {
    1
}

/// One configured layer: a name plus include/exclude reference lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,

    /// References whose expansion makes up this layer.
    #[serde(default, deserialize_with = "one_or_many")]
    pub include: Vec<String>,

    /// References removed from the expanded include set.
    #[serde(default, deserialize_with = "one_or_many")]
    pub exclude: Vec<String>,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn including(mut self, reference: impl Into<String>) -> Self {
        self.include.push(reference.into());
        self
    }

    pub fn excluding(mut self, reference: impl Into<String>) -> Self {
        self.exclude.push(reference.into());
        self
    }
}

/// One precedence category and the expression that computes its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub expression: String,
}

impl CategorySpec {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// Accept a bare string wherever a list of strings is expected.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

impl Default for ComposerConfig {
    /// The stock two-layer setup: a `site` layer fed from the confdir and a
    /// `modules` layer fed from every known module, with a four-level
    /// categorization (node, environment, osfamily, common).
    fn default() -> Self {
        Self {
            version: 1,
            layering: vec![
                LayerSpec::new("site")
                    .including("confdir-hiera:/hiera.toml?")
                    .including("confdir:/default?"),
                LayerSpec::new("modules")
                    .including("module:/*/default")
                    .including("module-hiera:/*/hiera.toml?"),
            ],
            categorization: vec![
                CategorySpec::new("node", "name"),
                CategorySpec::new("environment", "facts.environment | 'production'"),
                CategorySpec::new("osfamily", "facts.osfamily | 'unknown'"),
                CategorySpec::new("common", "'true'"),
            ],
        }
    }
}

impl ComposerConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// default configuration.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("no composer config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ConfigError::InvalidToml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation: version, names, duplicates, empty entries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::ValidationError(format!(
                "unsupported config version {} (only 1 is known)",
                self.version
            )));
        }

        let mut layer_names = std::collections::HashSet::new();
        for layer in &self.layering {
            if layer.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "layer name cannot be empty".into(),
                ));
            }
            if !layer_names.insert(layer.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate layer name '{}'",
                    layer.name
                )));
            }
            for entry in layer.include.iter().chain(&layer.exclude) {
                if entry.is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "layer '{}' has an empty reference entry",
                        layer.name
                    )));
                }
            }
        }

        let mut category_names = std::collections::HashSet::new();
        for category in &self.categorization {
            if category.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "category name cannot be empty".into(),
                ));
            }
            if !category_names.insert(category.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate category name '{}'",
                    category.name
                )));
            }
            if category.expression.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "category '{}' has an empty expression",
                    category.name
                )));
            }
        }

        Ok(())
    }

    /// Generate the default configuration as a TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("TOML parse error: {0}")]
    InvalidToml(String),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ComposerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layering.len(), 2);
        assert_eq!(config.layering[0].name, "site");
        assert_eq!(config.categorization[0].name, "node");
        assert_eq!(config.categorization.last().unwrap().name, "common");
    }

    #[test]
    fn include_accepts_single_string_or_list() {
        let config = ComposerConfig::from_toml(
            r#"
[[layering]]
name = "modules"
include = "module:/*/default"

[[layering]]
name = "site"
include = ["confdir:/default", "confdir-hiera:/hiera.toml?"]
"#,
        )
        .unwrap();
        assert_eq!(config.layering[0].include, vec!["module:/*/default"]);
        assert_eq!(config.layering[1].include.len(), 2);
        assert!(config.layering[0].exclude.is_empty());
    }

    #[test]
    fn duplicate_layer_names_rejected() {
        let result = ComposerConfig::from_toml(
            r#"
[[layering]]
name = "site"

[[layering]]
name = "site"
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn duplicate_category_names_rejected() {
        let result = ComposerConfig::from_toml(
            r#"
[[categorization]]
name = "node"
expression = "name"

[[categorization]]
name = "node"
expression = "name"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_expression_rejected() {
        let result = ComposerConfig::from_toml(
            r#"
[[categorization]]
name = "node"
expression = ""
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_version_rejected() {
        let result = ComposerConfig::from_toml("version = 2");
        assert!(result.is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = ComposerConfig::load_from(Path::new("/nonexistent/compose.toml")).unwrap();
        assert_eq!(config.layering.len(), 2);
    }

    #[test]
    fn load_from_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.toml");
        std::fs::write(&path, ComposerConfig::default_toml()).unwrap();
        let config = ComposerConfig::load_from(&path).unwrap();
        assert_eq!(config.layering.len(), 2);
        assert_eq!(config.categorization.len(), 4);
    }
}
