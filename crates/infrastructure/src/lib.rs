//! Infrastructure layer - Adapters for external systems
//!
//! Loads configuration, installs tracing, and implements the ports of the
//! speech and application layers: FFmpeg media decoding and a channel-backed
//! human reviewer.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, ENV_PREFIX};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
