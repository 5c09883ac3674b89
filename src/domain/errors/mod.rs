// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Required metadata column missing or positional columns misaligned
    Schema(String),
    /// Key column contains duplicate values
    DuplicateKey(String),
    /// Source file, video, clip or link target not found
    NotFound(String),
    /// Malformed timecode text
    Format(String),
    /// Start after end, or end beyond source duration
    Range(String),
    /// Command builder precondition failed
    Validation(String),
    /// External process reported a failure
    Execution(String),
    /// Filesystem operation failed
    Io(String),
}

impl DomainError {
    /// Short category name, used in reports and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Schema(_) => "schema",
            DomainError::DuplicateKey(_) => "duplicate_key",
            DomainError::NotFound(_) => "not_found",
            DomainError::Format(_) => "format",
            DomainError::Range(_) => "range",
            DomainError::Validation(_) => "validation",
            DomainError::Execution(_) => "execution",
            DomainError::Io(_) => "io",
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Schema(msg) => write!(f, "Schema error: {}", msg),
            DomainError::DuplicateKey(msg) => write!(f, "Duplicate key: {}", msg),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Format(msg) => write!(f, "Format error: {}", msg),
            DomainError::Range(msg) => write!(f, "Range error: {}", msg),
            DomainError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            DomainError::Execution(msg) => write!(f, "Execution failed: {}", msg),
            DomainError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}
