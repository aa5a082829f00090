//! Structured event names and levels.

use serde::{Deserialize, Serialize};

/// Log levels as they appear in JSONL output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Standard event names, used as tracing targets.
pub mod event_names {
    // Aggregation
    pub const AGGREGATE_STARTED: &str = "aggregate.started";
    pub const AGGREGATE_ROWS_DROPPED: &str = "aggregate.rows_dropped";
    pub const AGGREGATE_FINISHED: &str = "aggregate.finished";

    // Model boundary
    pub const MODEL_FIT_STARTED: &str = "model.fit_started";
    pub const MODEL_FIT_FINISHED: &str = "model.fit_finished";
    pub const MODEL_FIT_FAILED: &str = "model.fit_failed";
    pub const MODEL_TRANSFORM: &str = "model.transform";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_tracing() {
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warn);
        assert_eq!(serde_json::to_string(&Level::Info).unwrap(), "\"info\"");
    }
}
