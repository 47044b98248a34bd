//! Error types for ThreadMirror core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// I/O error reading or writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON5 parse error.
    #[error("JSON5 parse error: {0}")]
    Json5(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Semantic validation failures, all collected before returning.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A required environment variable was not set.
    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),
}
