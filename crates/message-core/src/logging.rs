//! Logging setup
//!
//! The bus logs through `tracing` under the [`BUS_TARGET`] target: listener
//! registration at `debug`, every post at `trace`, contained listener panics
//! at `error`. Applications that do not install their own subscriber can use
//! [`setup_logging`], which filters the bus separately from everything else:
//!
//! ```rust,no_run
//! use playkit_message_core::logging::{setup_logging, LoggingConfig};
//! use tracing::Level;
//!
//! // Bus internals at debug, the rest of the application at warn
//! setup_logging(LoggingConfig::new(Level::DEBUG, "player-demo")).unwrap();
//! ```

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{MessageError, Result};

/// Target of every event the bus logs
pub const BUS_TARGET: &str = env!("CARGO_CRATE_NAME");

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for the bus's own events
    pub bus_level: Level,
    /// Level for every other target
    pub default_level: Level,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
    /// Application name reported by [`log_welcome`]
    pub app_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            bus_level: Level::INFO,
            default_level: Level::WARN,
            json: false,
            app_name: "playkit".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn new(bus_level: Level, app_name: impl Into<String>) -> Self {
        LoggingConfig {
            bus_level,
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    pub fn with_default_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Filter directives, e.g. `warn,playkit_message_core=debug`
    pub fn directives(&self) -> String {
        format!(
            "{},{}={}",
            directive_level(self.default_level),
            BUS_TARGET,
            directive_level(self.bus_level)
        )
    }
}

fn directive_level(level: Level) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Install a global `tracing` subscriber built from `config`
///
/// A `RUST_LOG` variable replaces the configured directives. Fails if a
/// global subscriber is already installed.
pub fn setup_logging(config: LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.directives())
            .map_err(|e| MessageError::Config(format!("Invalid log filter: {}", e)))?,
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    installed.map_err(|e| MessageError::Config(format!("Failed to install subscriber: {}", e)))
}

/// Parse a log level such as `"debug"` or `"WARN"`
pub fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level).map_err(|_| MessageError::Config(format!("Invalid log level: {}", level)))
}

/// Log a startup line with the application name, version and bus log level
pub fn log_welcome(config: &LoggingConfig, version: &str) {
    tracing::info!(
        bus_level = %config.bus_level,
        "Starting {} v{}",
        config.app_name,
        version
    );
}
