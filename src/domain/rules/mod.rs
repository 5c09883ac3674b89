// Domain rules - Time-range and container policies

use std::path::Path;

use crate::domain::errors::*;
use crate::domain::model::VIDEO_EXTENSION;

/// Bounds checks for a clip against its source recording
pub struct TimeRangeValidator;

impl TimeRangeValidator {
    /// Check `start <= end <= total`. `source` only labels the error message.
    pub fn validate(source: &str, start: f64, end: f64, total: f64) -> Result<(), DomainError> {
        if start > end {
            return Err(DomainError::Range(format!(
                "Ending time ({}) is after start time ({})",
                end, start
            )));
        }
        if end > total {
            return Err(DomainError::Range(format!(
                "Ending time ({}) is longer then video length ({} - {} s)",
                end, source, total
            )));
        }
        Ok(())
    }
}

/// Container extensions accepted by the command builder
pub struct ExtensionPolicy;

impl ExtensionPolicy {
    pub const ACCEPTED: &'static [&'static str] = &[VIDEO_EXTENSION];

    /// Case-insensitive extension check
    pub fn check(path: &Path) -> Result<(), DomainError> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if Self::ACCEPTED.contains(&ext.as_str()) {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "Unknown extension: '{}' (valid extensions: [{}])",
                ext,
                Self::ACCEPTED.join(",")
            )))
        }
    }
}
