//! Error types for altool uploads

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using UploadError
pub type Result<T> = std::result::Result<T, UploadError>;

/// Errors raised while preparing or running an upload
#[derive(Debug, Error)]
pub enum UploadError {
    /// Missing or invalid upload options
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The uploader ran and exited unsuccessfully
    #[error("{}", subprocess_message(*code))]
    Subprocess { code: Option<i32> },

    /// The uploader could not be launched
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// Artifact could not be read
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error is a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

fn subprocess_message(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("altool exited with status {}", code),
        None => "altool was terminated by a signal".to_string(),
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
