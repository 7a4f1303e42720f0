//! Arena nodes of the discovery tree

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use domain::{GeomorphicCoordinate, ServiceKey, ServiceRegistration, StrategyId};
use serde::Serialize;

/// Factor applied to a node's dynamic cost on every lookup
pub const COST_DECAY: f32 = 0.9;

/// Handle of a node slot in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Colour metadata of the relaxed discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node
    Red,
    /// Black node
    Black,
}

/// Lookup counters, updated under a shared lock
#[derive(Debug)]
pub(crate) struct NodeMetrics {
    access_frequency: AtomicU64,
    dynamic_cost_bits: AtomicU32,
}

impl NodeMetrics {
    fn new(dynamic_cost: f32) -> Self {
        Self {
            access_frequency: AtomicU64::new(0),
            dynamic_cost_bits: AtomicU32::new(dynamic_cost.to_bits()),
        }
    }

    pub(crate) fn access_frequency(&self) -> u64 {
        self.access_frequency.load(Ordering::Relaxed)
    }

    pub(crate) fn dynamic_cost(&self) -> f32 {
        f32::from_bits(self.dynamic_cost_bits.load(Ordering::Relaxed))
    }

    /// Count one access and decay the cost
    pub(crate) fn record_access(&self) {
        self.access_frequency.fetch_add(1, Ordering::Relaxed);
        // the closure never declines, so the update always lands
        let _ = self
            .dynamic_cost_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f32::from_bits(bits) * COST_DECAY).to_bits())
            });
    }
}

/// What a node stores, as opposed to how it is linked
///
/// Removing a node with two children swaps payloads with its successor, so
/// everything that travels with a registration lives here.
#[derive(Debug)]
pub(crate) struct Payload {
    pub(crate) key: ServiceKey,
    pub(crate) coordinate: GeomorphicCoordinate,
    pub(crate) strategy: StrategyId,
    pub(crate) confidence_score: f32,
    pub(crate) metrics: NodeMetrics,
    pub(crate) sequence: u64,
}

impl Payload {
    pub(crate) fn new(registration: ServiceRegistration, sequence: u64) -> Self {
        Self {
            metrics: NodeMetrics::new(registration.dynamic_cost),
            key: registration.key,
            coordinate: registration.coordinate,
            strategy: registration.strategy,
            confidence_score: registration.confidence_score,
            sequence,
        }
    }

    pub(crate) fn into_registration(self) -> ServiceRegistration {
        let dynamic_cost = self.metrics.dynamic_cost();
        ServiceRegistration::new(self.key, self.coordinate, self.strategy)
            .with_cost(dynamic_cost)
            .with_confidence(self.confidence_score)
    }

    pub(crate) fn snapshot(&self) -> StrategyMatch {
        StrategyMatch {
            key: self.key.clone(),
            strategy: self.strategy.clone(),
            coordinate: self.coordinate,
            access_frequency: self.metrics.access_frequency(),
            dynamic_cost: self.metrics.dynamic_cost(),
            confidence_score: self.confidence_score,
        }
    }
}

/// A node slot: payload plus links and balance metadata
#[derive(Debug)]
pub(crate) struct DiscoveryNode {
    pub(crate) payload: Payload,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    /// Traversal only; a node is owned by its arena slot
    pub(crate) parent: Option<NodeId>,
    /// Strict discipline: height of the subtree rooted here, leaves are 1
    pub(crate) height: u32,
    /// Relaxed discipline colour
    pub(crate) color: Color,
}

impl DiscoveryNode {
    pub(crate) const fn new(payload: Payload, parent: Option<NodeId>) -> Self {
        Self {
            payload,
            left: None,
            right: None,
            parent,
            height: 1,
            color: Color::Red,
        }
    }
}

/// Snapshot of a node returned by lookups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyMatch {
    /// `(service, operation)` of the node
    pub key: ServiceKey,
    /// Strategy the node selects
    pub strategy: StrategyId,
    /// Geomorphic position of the node
    pub coordinate: GeomorphicCoordinate,
    /// Accesses including the one that produced this snapshot
    pub access_frequency: u64,
    /// Cost after this access's decay
    pub dynamic_cost: f32,
    /// Static confidence of the strategy
    pub confidence_score: f32,
}
