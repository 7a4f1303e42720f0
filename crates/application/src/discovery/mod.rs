//! Adaptive service discovery
//!
//! Strategies live in an arena-backed ordered tree whose balancing
//! discipline is chosen per structural mutation: height balanced for
//! read-heavy traffic, colour balanced for write-heavy traffic, or picked
//! from the observed mix. [`ServiceDirectory`] shares one tree between
//! concurrent lookups.

mod arena;
mod balance;
mod directory;
mod node;
mod relaxed;
mod strict;
mod tree;

pub use balance::Discipline;
pub use directory::ServiceDirectory;
pub use node::{COST_DECAY, NodeId, StrategyMatch};
pub use tree::{DEFAULT_HYBRID_READ_BIAS, DiscoveryTree};
