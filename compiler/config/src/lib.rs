#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! ldgen Configuration
//!
//! Loads and saves the optional TOML file that supplies defaults for:
//! - Logging (level, log file)
//! - Code generation (specification path, output directory)
//! - Transport tunables (timeout, user agent)
//!
//! Command-line flags override every value read here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
pub use transport::TransportConfig;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Code generation settings
    #[serde(default)]
    pub codegen: CodegenConfig,
    /// Transport settings for remote fragments and pipe-modules
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (error, warn, info, debug, trace)
    pub level: String,
    /// Log file path (optional; stderr when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

/// Code generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the YAML specification (optional; usually given on the command line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_path: Option<PathBuf>,
    /// Where to write the generated artifacts
    pub output_dir: PathBuf,
}

impl Default for CodegenConfig {
    fn default() -> Self { Self { input_path: None, output_dir: Config::default_output_dir() } }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/ldgen/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("ldgen");
        Ok(config_dir.join("config.toml"))
    }

    /// Get the default output directory for generated artifacts
    pub fn default_output_dir() -> PathBuf {
        Self::default_output_dir_internal(
            std::env::var("OUT_DIR").ok(),
            std::env::current_dir().ok(),
        )
    }

    /// Internal function for testing - allows injection of environment values
    fn default_output_dir_internal(
        out_dir: Option<String>,
        current_dir: Option<PathBuf>,
    ) -> PathBuf {
        if let Some(out_dir) = out_dir {
            return PathBuf::from(out_dir);
        }

        if let Some(current_dir) = current_dir {
            return current_dir.join("generated");
        }

        PathBuf::from("generated")
    }
}
