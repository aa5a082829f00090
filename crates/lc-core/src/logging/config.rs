//! Logging configuration.
//!
//! Resolution order, last wins: defaults, `RUST_LOG`, `LC_LOG`,
//! `LC_LOG_FORMAT`, then caller overrides.

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "LC_LOG";
pub const ENV_LOG_FORMAT: &str = "LC_LOG_FORMAT";
pub const ENV_RUST_LOG: &str = "RUST_LOG";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Console lines for people.
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "pretty" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity threshold, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

const LEVEL_NAMES: [(LogLevel, &str); 6] = [
    (LogLevel::Trace, "trace"),
    (LogLevel::Debug, "debug"),
    (LogLevel::Info, "info"),
    (LogLevel::Warn, "warn"),
    (LogLevel::Error, "error"),
    (LogLevel::Off, "off"),
];

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        LEVEL_NAMES[self as usize].1
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s.trim().to_ascii_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "quiet" | "none" => "off".to_string(),
            other => other.to_string(),
        };
        LEVEL_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(level, _)| *level)
            .ok_or_else(|| format!("unknown log level '{}'", s.trim()))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Most verbose level named by a `RUST_LOG` directive list such as
/// `warn,lc_core=debug`. Directives without a recognizable level are skipped.
fn most_verbose_directive(rust_log: &str) -> Option<LogLevel> {
    rust_log
        .split(',')
        .filter_map(|directive| {
            let level = directive.rsplit('=').next()?;
            level.parse::<LogLevel>().ok()
        })
        .min()
}

/// Raw environment values that feed a [`LogConfig`].
#[derive(Debug, Clone, Default)]
pub struct LogEnv {
    pub lc_log: Option<String>,
    pub rust_log: Option<String>,
    pub lc_log_format: Option<String>,
}

impl LogEnv {
    pub fn capture() -> Self {
        LogEnv {
            lc_log: std::env::var(ENV_LOG_LEVEL).ok(),
            rust_log: std::env::var(ENV_RUST_LOG).ok(),
            lc_log_format: std::env::var(ENV_LOG_FORMAT).ok(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human output with a timestamp.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::default(),
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Configuration from the process environment plus caller overrides.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        Self::resolve(&LogEnv::capture(), level, format)
    }

    /// Configuration from captured environment values plus caller overrides.
    ///
    /// Unparseable values are ignored rather than reported.
    pub fn resolve(env: &LogEnv, level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        let env_level = env
            .lc_log
            .as_deref()
            .and_then(|v| v.parse().ok())
            .or_else(|| env.rust_log.as_deref().and_then(most_verbose_directive));
        let env_format = env.lc_log_format.as_deref().and_then(|v| v.parse().ok());

        let defaults = LogConfig::default();
        LogConfig {
            level: level.or(env_level).unwrap_or(defaults.level),
            format: format.or(env_format).unwrap_or(defaults.format),
            timestamps: defaults.timestamps,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}
