//! Subscriber configuration and installation

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Plain,
    /// One JSON object per event
    Json,
}

/// Configuration for logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directives used when `RUST_LOG` is unset
    /// (e.g. "info", "application=debug,ai_speech=info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Line format
    #[serde(default)]
    pub format: LogFormat,

    /// Include the event target
    #[serde(default = "default_true")]
    pub with_target: bool,

    /// Include thread ids
    #[serde(default)]
    pub with_thread_ids: bool,

    /// Include source file and line
    #[serde(default)]
    pub with_file: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            format: LogFormat::default(),
            with_target: default_true(),
            with_thread_ids: false,
            with_file: false,
        }
    }
}

impl TelemetryConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the filter directives do not parse.
    pub fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(&self.log_filter)
            .map(|_| ())
            .map_err(|e| format!("invalid log filter '{}': {e}", self.log_filter))
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured filter.
///
/// # Errors
///
/// Returns `TelemetryError::Filter` if the configured filter does not parse,
/// or `TelemetryError::Init` if a global subscriber is already installed.
///
/// # Example
///
/// ```ignore
/// use infrastructure::telemetry::{TelemetryConfig, init_telemetry};
///
/// init_telemetry(&TelemetryConfig::default())?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .map_err(|e| TelemetryError::Filter(e.to_string()))?,
    };

    let (plain, json) = match config.format {
        LogFormat::Plain => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(config.with_target)
                    .with_thread_ids(config.with_thread_ids)
                    .with_file(config.with_file)
                    .with_line_number(config.with_file),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target)
                    .with_thread_ids(config.with_thread_ids)
                    .with_file(config.with_file)
                    .with_line_number(config.with_file),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(plain)
        .with(json)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(format = ?config.format, "Telemetry initialized");
    Ok(())
}

/// Error type for telemetry initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Filter directives did not parse
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}
