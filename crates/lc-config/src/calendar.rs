//! Calendar configuration types.
//!
//! A config file may be JSON or TOML; every field has a default so an empty
//! file describes hourly bins on a Monday-first week.

use std::path::Path;

use lc_common::WeekStart;
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// What to do with groups that end up with no surviving events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyGroups {
    /// Omit groups with zero surviving events from the output.
    #[default]
    Drop,
    /// Emit every known group, with an explicit all-zero row when empty.
    Keep,
}

impl std::fmt::Display for EmptyGroups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyGroups::Drop => write!(f, "drop"),
            EmptyGroups::Keep => write!(f, "keep"),
        }
    }
}

/// Complete calendar configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Width of one timeslot in minutes.
    #[serde(default = "default_bin_minutes")]
    pub bin_minutes: u32,

    #[serde(default)]
    pub week_start: WeekStart,

    #[serde(default)]
    pub empty_groups: EmptyGroups,

    /// chrono format strings tried, in order, for text timestamps.
    #[serde(default = "default_timestamp_formats")]
    pub timestamp_formats: Vec<String>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_bin_minutes() -> u32 {
    60
}

fn default_timestamp_formats() -> Vec<String> {
    vec![
        "%Y-%m-%d %H:%M:%S%.f".to_string(),
        "%Y-%m-%dT%H:%M:%S%.f".to_string(),
        "%Y-%m-%d %H:%M".to_string(),
    ]
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            schema_version: default_schema_version(),
            bin_minutes: default_bin_minutes(),
            week_start: WeekStart::default(),
            empty_groups: EmptyGroups::default(),
            timestamp_formats: default_timestamp_formats(),
        }
    }
}

impl CalendarConfig {
    /// Load a config file, choosing the parser from the extension.
    ///
    /// `.toml` files are parsed as TOML; everything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        if is_toml(path) {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse a config from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text).map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// Number of bins in one day.
    ///
    /// Only meaningful for a validated config.
    pub fn slots_per_day(&self) -> u32 {
        crate::MINUTES_IN_DAY / self.bin_minutes.max(1)
    }

    pub fn with_bin_minutes(mut self, minutes: u32) -> Self {
        self.bin_minutes = minutes;
        self
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn with_empty_groups(mut self, policy: EmptyGroups) -> Self {
        self.empty_groups = policy;
        self
    }
}

pub(crate) fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}
