//! Tracing initialization
//!
//! Installs a `tracing-subscriber` registry with an environment-aware filter
//! and a plain or JSON formatting layer.

mod subscriber;

pub use subscriber::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
