//! Application layer - Use cases and orchestration
//!
//! Runs speech/text conversion cycles over an explicit [`ConversionContext`]:
//! variation handling and coordinate mapping, adaptive strategy discovery,
//! drift tracking and escalation to a human reviewer. Collaborators are
//! reached through ports; adapters live in the infrastructure layer.

pub mod config;
pub mod discovery;
pub mod error;
pub mod ports;
pub mod services;

pub use config::ConversionConfig;
pub use discovery::{DiscoveryTree, Discipline, ServiceDirectory, StrategyMatch};
pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
