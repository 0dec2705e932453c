//! Configuration loading and config file resolution
//!
//! Everything here is optional. With no config file the injector emits
//! `-DBUILD_TIMESTAMP="YYYY-MM-DD HH:MM:SS UTC"` into `BUILD_FLAGS`.
//!
//! # Config file priority
//!
//! 1. Command-line argument (`--config`)
//! 2. `<config_dir>/buildstamp/config.toml`
//! 3. Built-in defaults

use crate::build_env::BUILD_FLAGS;
use crate::time::{is_valid_pattern, DEFAULT_FORMAT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the define the injector emits by default
pub const DEFAULT_DEFINE: &str = "BUILD_TIMESTAMP";

/// Injector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampConfig {
    /// Preprocessor define name
    #[serde(default = "default_define")]
    pub define: String,

    /// strftime pattern for the timestamp
    #[serde(default = "default_format")]
    pub format: String,

    /// Build environment key holding the compiler flag list
    #[serde(default = "default_flags_key")]
    pub flags_key: String,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            define: default_define(),
            format: default_format(),
            flags_key: default_flags_key(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_define() -> String {
    DEFAULT_DEFINE.to_string()
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_flags_key() -> String {
    BUILD_FLAGS.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl StampConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// A missing file logs a warning and yields defaults. A file that exists
    /// but cannot be read, parsed or validated is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve and load configuration in priority order
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_path {
            return Self::load(path);
        }

        // Priority 2: Platform config directory
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Priority 3: Built-in defaults
        Ok(Self::default())
    }

    /// Apply command-line overrides, then re-validate
    pub fn with_overrides(mut self, define: Option<String>, format: Option<String>) -> Result<Self> {
        if let Some(define) = define {
            self.define = define;
        }
        if let Some(format) = format {
            self.format = format;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the configuration can produce a valid define.
    ///
    /// An empty `format` is accepted; it always takes the ISO 8601 fallback.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.define) {
            return Err(Error::Config(format!(
                "define '{}' is not a valid preprocessor identifier",
                self.define
            )));
        }
        if self.flags_key.trim().is_empty() {
            return Err(Error::Config("flags_key must not be empty".to_string()));
        }
        if !is_valid_pattern(&self.format) {
            return Err(Error::Config(format!(
                "format '{}' contains an unknown strftime specifier",
                self.format
            )));
        }
        Ok(())
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("buildstamp").join("config.toml"))
}

/// C preprocessor identifier: `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
