//! Error types for latent calendar.
//!
//! Every failure is returned to the caller; nothing in the workspace retries.
//! Each variant has a stable numeric code, a category, and a hint on whether
//! fixing the input and calling again can succeed.
//!
//! # JSON form
//! ```json
//! {
//!   "code": 20,
//!   "category": "shape",
//!   "message": "shape mismatch in predict: expected 168 columns, got 24",
//!   "recoverable": true,
//!   "context": { "expected": 168, "actual": 24 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for latent calendar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Calendar configuration errors (bin width, schema).
    Config,
    /// Matrix shapes and rejected cell values.
    Shape,
    /// Vocabulary token decoding.
    Parse,
    /// Latent component model state and numerics.
    Model,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Shape => write!(f, "shape"),
            ErrorCategory::Parse => write!(f, "parse"),
            ErrorCategory::Model => write!(f, "model"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for latent calendar.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("bin width of {minutes} minutes does not evenly divide a day")]
    InvalidBinWidth { minutes: u32 },

    // Shape and value errors (20-29)
    #[error("shape mismatch in {context}: expected {expected} columns, got {actual}")]
    Shape {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("incompatible calendar grids: {0}")]
    IncompatibleGrid(String),

    // Parse errors (30-39)
    #[error("malformed vocab token {token:?}: {reason}")]
    Parse { token: String, reason: String },

    // Model errors (40-49)
    #[error("topic {topic} has zero total weight and cannot be normalized")]
    DegenerateTopic { topic: usize },

    #[error("model has not been fitted")]
    NotFitted,

    #[error("model backend failed: {0}")]
    Backend(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable numeric code, grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Shape and value errors
    /// - 30-39: Parse errors
    /// - 40-49: Model errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Configuration(_) => 10,
            Error::InvalidBinWidth { .. } => 11,
            Error::Shape { .. } => 20,
            Error::InvalidValue { .. } => 21,
            Error::MissingColumn(_) => 22,
            Error::IncompatibleGrid(_) => 23,
            Error::Parse { .. } => 30,
            Error::DegenerateTopic { .. } => 40,
            Error::NotFitted => 41,
            Error::Backend(_) => 42,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Configuration(_) | Error::InvalidBinWidth { .. } => ErrorCategory::Config,

            Error::Shape { .. }
            | Error::InvalidValue { .. }
            | Error::MissingColumn(_)
            | Error::IncompatibleGrid(_) => ErrorCategory::Shape,

            Error::Parse { .. } => ErrorCategory::Parse,

            Error::DegenerateTopic { .. } | Error::NotFitted | Error::Backend(_) => {
                ErrorCategory::Model
            }

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether the caller can fix the input and call again.
    ///
    /// A degenerate topic is a property of the fitted components and will not
    /// change until the model is refitted.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Configuration(_) | Error::InvalidBinWidth { .. } => true,
            Error::Shape { .. } | Error::InvalidValue { .. } | Error::MissingColumn(_) => true,
            Error::IncompatibleGrid(_) => true,
            Error::Parse { .. } => true,
            Error::DegenerateTopic { .. } => false,
            Error::NotFitted => true,
            Error::Backend(_) => false,
            Error::Io(_) | Error::Json(_) => true,
        }
    }

    /// Shorthand for a shape error at the model or frame boundary.
    pub fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
        Error::Shape {
            context,
            expected,
            actual,
        }
    }

    /// Shorthand for a rejected cell or argument value.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a malformed vocab token.
    pub fn parse(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// An error flattened for JSON consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., offending token).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidBinWidth { minutes } => {
                context.insert("bin_minutes".to_string(), serde_json::json!(minutes));
            }
            Error::Shape {
                expected, actual, ..
            } => {
                context.insert("expected".to_string(), serde_json::json!(expected));
                context.insert("actual".to_string(), serde_json::json!(actual));
            }
            Error::Parse { token, .. } => {
                context.insert("token".to_string(), serde_json::json!(token));
            }
            Error::DegenerateTopic { topic } => {
                context.insert("topic".to_string(), serde_json::json!(topic));
            }
            Error::InvalidValue { field, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Compact JSON; falls back to a bare code object if serialization fails.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
