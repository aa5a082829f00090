//! Latent calendar configuration loading and validation.
//!
//! This crate provides:
//! - Typed calendar configuration (bin width, week start, empty-group policy)
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots so wide matrices can be traced to the settings that built them

pub mod calendar;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use calendar::{CalendarConfig, EmptyGroups};
pub use resolve::{load_config, resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::{ConfigSnapshot, GridSummary};
pub use validate::{validate_calendar, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Minutes in one day; every bin width must divide it.
pub const MINUTES_IN_DAY: u32 = 24 * 60;
