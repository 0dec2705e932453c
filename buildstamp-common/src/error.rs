//! Common error types for buildstamp

use thiserror::Error;

/// Common result type for buildstamp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across buildstamp crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Build environment entry has the wrong shape for the requested operation
    #[error("Malformed build environment: {0}")]
    MalformedEnvironment(String),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Value could not be serialized to TOML
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Invalid user input or stamp value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
