//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::calendar::CalendarConfig;
use crate::MINUTES_IN_DAY;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for lc_common::Error {
    fn from(err: ValidationError) -> Self {
        lc_common::Error::Configuration(err.to_string())
    }
}

/// Validate a calendar configuration semantically.
pub fn validate_calendar(config: &CalendarConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_bin_minutes(config.bin_minutes)?;

    if config.timestamp_formats.is_empty() {
        return Err(ValidationError::SemanticError(
            "timestamp_formats must list at least one format".to_string(),
        ));
    }

    for (i, format) in config.timestamp_formats.iter().enumerate() {
        if format.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("timestamp_formats[{}]", i),
                message: "Must not be blank".to_string(),
            });
        }
    }

    Ok(())
}

/// Validate that a bin width splits a day into whole bins.
pub fn validate_bin_minutes(minutes: u32) -> ValidationResult<()> {
    if minutes == 0 || minutes > MINUTES_IN_DAY {
        return Err(ValidationError::InvalidValue {
            field: "bin_minutes".to_string(),
            message: format!("Must be in [1, {}], got {}", MINUTES_IN_DAY, minutes),
        });
    }

    if MINUTES_IN_DAY % minutes != 0 {
        return Err(ValidationError::InvalidValue {
            field: "bin_minutes".to_string(),
            message: format!("Must evenly divide {}, got {}", MINUTES_IN_DAY, minutes),
        });
    }

    Ok(())
}
