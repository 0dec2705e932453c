//! Build environment model
//!
//! A build environment is owned by the surrounding build orchestrator: a
//! mapping from key to either a single string or a list of strings. The
//! injector only ever appends to one list-valued entry.
//!
//! On disk the environment is a flat TOML table:
//!
//! ```toml
//! CC = "arm-none-eabi-gcc"
//! BUILD_FLAGS = ["-Os", "-DUSE_CAN=1"]
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Key holding the compiler flag list
pub const BUILD_FLAGS: &str = "BUILD_FLAGS";

/// Value stored under a build environment key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    List(Vec<String>),
    Scalar(String),
}

/// Mutable key-to-value(s) mapping representing compiler configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildEnvironment {
    entries: BTreeMap<String, EnvValue>,
}

impl BuildEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value stored under `key`
    pub fn set(&mut self, key: impl Into<String>, value: EnvValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.entries.get(key)
    }

    /// List stored under `key`, or `None` if absent or scalar
    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.entries.get(key)? {
            EnvValue::List(items) => Some(items),
            EnvValue::Scalar(_) => None,
        }
    }

    /// Compiler flags under the default [`BUILD_FLAGS`] key
    pub fn flags(&self) -> &[String] {
        self.list(BUILD_FLAGS).unwrap_or(&[])
    }

    /// Append values to the list under `key`, preserving existing entries.
    ///
    /// An absent key is created as an empty list first. A scalar under
    /// `key` is an error and leaves the environment untouched.
    pub fn append<I, S>(&mut self, key: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| EnvValue::List(Vec::new()));

        match entry {
            EnvValue::List(items) => {
                items.extend(values.into_iter().map(Into::into));
                Ok(())
            }
            EnvValue::Scalar(value) => Err(Error::MalformedEnvironment(format!(
                "'{}' holds a single value ({:?}), expected a list",
                key, value
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a build environment from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Load a build environment file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::MalformedEnvironment(format!(
                "cannot read build environment {}: {}",
                path.display(),
                e
            ))
        })?;
        let env = Self::from_toml_str(&text)?;
        if env.is_empty() {
            warn!("Build environment {} has no entries", path.display());
        }
        debug!("Loaded build environment {} ({} keys)", path.display(), env.len());
        Ok(env)
    }

    /// Write the environment back atomically (temp file + rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;

        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = std::path::PathBuf::from(temp_name);

        std::fs::write(&temp_path, content)?;
        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!("Wrote build environment {}", path.display());
        Ok(())
    }
}
