//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.
//! Speech backends and media decoding are defined in `ai_speech`.

mod human_validation_port;

#[cfg(test)]
pub use human_validation_port::MockHumanValidationPort;
pub use human_validation_port::{HumanValidationPort, ValidationResponse};
