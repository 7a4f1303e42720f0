//! Value Objects - Immutable, identity-less domain primitives

mod conversion_direction;
mod coordinate;
mod cycle_id;
mod failure_zone;
mod geomorphic_coordinate;
mod service_key;
mod strategy_id;
mod tree_mode;

pub use conversion_direction::ConversionDirection;
pub use coordinate::{Coordinate, DEFAULT_COHERENCE_THRESHOLD};
pub use cycle_id::CycleId;
pub use failure_zone::FailureZone;
pub use geomorphic_coordinate::GeomorphicCoordinate;
pub use service_key::ServiceKey;
pub use strategy_id::StrategyId;
pub use tree_mode::TreeMode;
