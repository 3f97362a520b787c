//! Documenter configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! layout: separate
//! timestamp_format: "%Y-%m-%d %H:%M"
//! ```
//!
//! Every key is optional; missing keys take the defaults.

use std::io::BufReader;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Default header timestamp format (chrono strftime syntax).
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors loading a [`DocumenterConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The timestamp format contains an unknown specifier.
    #[error("invalid timestamp format '{0}'")]
    InvalidTimestampFormat(String),
}

/// Where data-source facts appear in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum DataSourceLayout {
    /// Connection and table list are part of the database & query section.
    #[default]
    Folded,
    /// A data source section precedes the database & query section.
    Separate,
}

/// Settings for one documenter run.
///
/// # Examples
///
/// ```
/// use rptdoc_extract::{DataSourceLayout, DocumenterConfig};
///
/// let config = DocumenterConfig::from_yaml_str("layout: separate\n").unwrap();
/// assert_eq!(config.layout, DataSourceLayout::Separate);
/// assert_eq!(config.timestamp_format, "%Y-%m-%d %H:%M:%S");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumenterConfig {
    pub layout: DataSourceLayout,
    pub timestamp_format: String,
}

impl Default for DocumenterConfig {
    fn default() -> Self {
        Self {
            layout: DataSourceLayout::default(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl DocumenterConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if parsing fails, or
    /// [`ConfigError::InvalidTimestampFormat`] for a bad format string.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_yaml::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_layout(mut self, layout: DataSourceLayout) -> Self {
        self.layout = layout;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = StrftimeItems::new(&self.timestamp_format)
            .any(|item| matches!(item, Item::Error));
        if invalid {
            return Err(ConfigError::InvalidTimestampFormat(
                self.timestamp_format.clone(),
            ));
        }
        Ok(())
    }
}
