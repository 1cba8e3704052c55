//! Error types for configuration handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating the run configuration.
///
/// All of these are fatal: the run stops before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("I/O error on config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but holds values the pipeline cannot use.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Refused to overwrite an existing file with the template.
    #[error("Config file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
