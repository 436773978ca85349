//! Per-graph TOML profiles
//!
//! ```toml
//! format = "PNG"
//!
//! [[options]]
//! key = "title"
//! expression = "Load on %{HOST}"
//!
//! [[elements]]
//! element = "DEF:x=unused:load:AVERAGE"
//! expression = "%{DIR}/hosts/*.rrd"
//! directory = "/srv/rrd"
//!
//! [environment]
//! HOSTS = "%{STEM}"
//! ```

use rrdgraph_compiler::host::Expression;
use rrdgraph_compiler::{Configuration, ConfigurationError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphProfile {
    /// Output format name; inferred from the target suffix when absent
    pub format: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionEntry>,
    #[serde(default)]
    pub elements: Vec<ElementEntry>,
    /// Environment key to expression, evaluated per matched file
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionEntry {
    pub key: String,
    pub value: Option<String>,
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementEntry {
    pub element: String,
    /// Path expression for `DEF`, legend expression otherwise
    pub expression: Option<String>,
    /// Base directory expression for `DEF`
    pub directory: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Failed to read profile '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid TOML in profile: {reason}")]
    Parse { reason: String },

    #[error("Invalid profile entry: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl GraphProfile {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = fs::read_to_string(path).map_err(|e| ProfileError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        toml::from_str(content).map_err(|e| ProfileError::Parse {
            reason: e.to_string(),
        })
    }

    /// Build the compiler configuration, rejecting unknown entries
    pub fn to_configuration(&self) -> Result<Configuration, ProfileError> {
        let mut configuration = Configuration::new();

        if let Some(format) = &self.format {
            configuration.set_format_name(format)?;
        }

        for option in &self.options {
            configuration.add_option(
                &option.key,
                option.value.as_deref(),
                option.expression.as_deref().map(Expression::new),
            )?;
        }

        for entry in &self.elements {
            configuration.add_element(
                &entry.element,
                entry.expression.as_deref().map(Expression::new),
                entry.directory.as_deref().map(Expression::new),
            )?;
        }

        for (key, expression) in &self.environment {
            configuration.add_environment(key, Expression::new(expression.as_str()));
        }

        rrdgraph_compiler::log_debug!("Graph profile loaded",
            "options" => self.options.len(),
            "elements" => self.elements.len(),
            "environment" => self.environment.len()
        );

        Ok(configuration)
    }
}
