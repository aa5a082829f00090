//! Structured logging for latent calendar.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for pipelines
//!
//! The library only emits events; installing a subscriber is left to the
//! application, which calls [`init_logging`] once at startup.
//!
//! # Usage
//!
//! ```ignore
//! use lc_core::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config);
//! ```

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogEnv, LogFormat, LogLevel};
pub use events::{event_names, Level};
pub use layer::JsonlLayer;

use std::io::IsTerminal;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the event filter: `RUST_LOG` directives when present, otherwise
/// the configured level.
fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .from_env_lossy()
}

/// Install the global subscriber.
///
/// Returns false when a subscriber was already installed.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = build_filter(config);

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
                    .is_ok()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
                    .is_ok()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(JsonlLayer::stderr())
            .try_init()
            .is_ok(),
    }
}

/// Initialize logging from the environment (for tests and simple cases).
pub fn init_default_logging() -> bool {
    init_logging(&LogConfig::from_env(None, None))
}
