//! Configuration for the haricot tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (haricot.toml)
//! - Environment variables (HARICOT__*)
//!
//! ## Example config file (haricot.toml):
//! ```toml
//! [registry]
//! duplicates = "reject"
//! context = "category"
//!
//! [validation]
//! strict = true
//!
//! [export]
//! output_format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::registry::DuplicatePolicy;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HaricotConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// What happens when an id is registered twice
    #[serde(default)]
    pub duplicates: DuplicatePolicy,

    /// Context value registration runs for when none is given
    #[serde(default = "default_context")]
    pub context: String,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Treat any violation as a failure
    #[serde(default = "default_true")]
    pub strict: bool,
}

/// Export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_context() -> String {
    "category".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::Reject,
            context: default_context(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl HaricotConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["haricot.toml", ".haricot.toml", "config/haricot.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("org", "caercam", "haricot") {
            let xdg_config = config_dir.config_dir().join("haricot.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // HARICOT__REGISTRY__DUPLICATES=replace and friends
        builder = builder.add_source(
            Environment::with_prefix("HARICOT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = self
            .to_toml()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
