//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → defaults.

use std::path::{Path, PathBuf};

use crate::calendar::CalendarConfig;
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_calendar, ValidationError, ValidationResult};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to the calendar config (or None if not found).
    pub calendar: Option<PathBuf>,

    /// Source of the calendar config (for diagnostics).
    pub calendar_source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided by the caller.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "LATENT_CALENDAR_CONFIG";
pub const ENV_CONFIG_DIR: &str = "LATENT_CALENDAR_CONFIG_DIR";

/// Config file names tried inside a directory, in order.
const CONFIG_FILENAMES: [&str; 2] = ["calendar.toml", "calendar.json"];

/// Application name for XDG directories.
const APP_NAME: &str = "latent-calendar";

/// Resolve the calendar configuration path.
///
/// Resolution order:
/// 1. Explicit path (if provided and it exists)
/// 2. LATENT_CALENDAR_CONFIG environment variable
/// 3. LATENT_CALENDAR_CONFIG_DIR environment variable + filename
/// 4. XDG config directory (~/.config/latent-calendar/)
/// 5. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    let mut paths = ConfigPaths::default();
    paths.calendar = resolve_single_config(cli_path, &mut paths.calendar_source);
    paths
}

fn resolve_single_config(cli_path: Option<&Path>, source: &mut ConfigSource) -> Option<PathBuf> {
    // 1. CLI argument
    if let Some(path) = cli_path {
        if path.exists() {
            *source = ConfigSource::CliArgument;
            return Some(path.to_path_buf());
        }
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = find_in_dir(Path::new(&config_dir)) {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        if let Some(path) = find_in_dir(&dir) {
            *source = ConfigSource::XdgConfig;
            return Some(path);
        }
    }

    *source = ConfigSource::BuiltinDefault;
    None
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Get the XDG config directory for latent-calendar.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Resolve, read, parse, and validate the calendar configuration.
///
/// Falls back to defaults when no file is found. The returned snapshot
/// records where the config came from and a hash of its content.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<(CalendarConfig, ConfigSnapshot)> {
    let paths = resolve_config(cli_path);

    let (config, content) = match &paths.calendar {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let config = if crate::calendar::is_toml(path) {
                CalendarConfig::from_toml_str(&content)?
            } else {
                CalendarConfig::from_json_str(&content)?
            };
            (config, Some(content))
        }
        None => (CalendarConfig::default(), None),
    };

    validate_calendar(&config)?;

    let snapshot = ConfigSnapshot::new(&config, &paths, content.as_deref());
    Ok((config, snapshot))
}
