//! Error handling module for the assembler

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type at the crate boundary
#[derive(Error, Debug)]
pub enum AssemblerError {
    /// Pipeline or metadata failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configuration value rejected
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Logging could not be initialised
    #[error("Failed to initialise logging: {message}")]
    Logging { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AssemblerError {
    pub fn config(message: impl Into<String>) -> Self {
        AssemblerError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for assembler operations
pub type AssemblerResult<T> = std::result::Result<T, AssemblerError>;
