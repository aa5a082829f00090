//! Configuration snapshots for reproducibility.
//!
//! A snapshot captures the exact calendar configuration used for an
//! aggregation, so wide matrices produced in different runs can be checked
//! for column compatibility before they are combined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::calendar::CalendarConfig;
use crate::resolve::{ConfigPaths, ConfigSource};

/// The calendar configuration an aggregation ran under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub captured_at: DateTime<Utc>,

    pub schema_version: String,

    /// File the config was read from, if any.
    #[serde(default)]
    pub config_path: Option<String>,

    /// How the file was located.
    pub config_source: String,

    /// Hex SHA-256 of the file content, or of the serialized defaults.
    pub config_hash: String,

    pub grid: GridSummary,
}

/// Values that decide the column layout of a wide matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSummary {
    pub bin_minutes: u32,
    pub week_start: String,
    pub empty_groups: String,
    /// Total timeslots in one week (7 * bins per day).
    pub slots_per_week: u32,
}

impl ConfigSnapshot {
    /// Snapshot of `config`, hashing `content` when a file was read.
    pub fn new(config: &CalendarConfig, paths: &ConfigPaths, content: Option<&str>) -> Self {
        let config_hash = match content {
            Some(text) => sha256_hex(text),
            None => sha256_hex(&canonical_json(config)),
        };

        ConfigSnapshot {
            captured_at: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_path: paths.calendar.as_ref().map(|p| p.display().to_string()),
            config_source: paths.calendar_source.to_string(),
            config_hash,
            grid: GridSummary::from_config(config),
        }
    }

    /// Snapshot of the built-in defaults.
    pub fn builtin() -> Self {
        let config = CalendarConfig::default();
        let paths = ConfigPaths {
            calendar: None,
            calendar_source: ConfigSource::BuiltinDefault,
        };
        Self::new(&config, &paths, None)
    }

    /// Pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Same configuration content.
    pub fn same_config(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// Whether matrices built under both snapshots share a column layout.
    ///
    /// Two different files can still describe the same grid.
    pub fn same_grid(&self, other: &ConfigSnapshot) -> bool {
        self.grid.bin_minutes == other.grid.bin_minutes
            && self.grid.week_start == other.grid.week_start
    }

    /// Leading 12 hex digits of the hash, for log lines.
    pub fn short_hash(&self) -> &str {
        self.config_hash.get(..12).unwrap_or(&self.config_hash)
    }
}

impl GridSummary {
    fn from_config(config: &CalendarConfig) -> Self {
        GridSummary {
            bin_minutes: config.bin_minutes,
            week_start: config.week_start.to_string(),
            empty_groups: config.empty_groups.to_string(),
            slots_per_week: 7 * config.slots_per_day(),
        }
    }
}

fn canonical_json(config: &CalendarConfig) -> String {
    serde_json::to_string(config).unwrap_or_else(|_| format!("{:?}", config))
}

fn sha256_hex(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
