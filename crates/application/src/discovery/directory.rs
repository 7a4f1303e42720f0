//! Shared handle to the discovery tree
//!
//! Lookups take the shared side of the lock and update per-node counters
//! atomically; registrations, removals and mode changes take the exclusive
//! side.

use domain::{
    ConversionDirection, Coordinate, GeomorphicCoordinate, ServiceKey, ServiceRegistration,
    TreeMode,
};
use parking_lot::RwLock;
use tracing::{debug, info};

use super::balance::Discipline;
use super::node::StrategyMatch;
use super::tree::DiscoveryTree;
use crate::error::ApplicationError;

/// Thread-safe strategy directory
#[derive(Debug, Default)]
pub struct ServiceDirectory {
    tree: RwLock<DiscoveryTree>,
}

impl ServiceDirectory {
    /// Create an empty directory in `mode`
    #[must_use]
    pub fn new(mode: TreeMode) -> Self {
        Self::from_tree(DiscoveryTree::new(mode))
    }

    /// Wrap a prepared tree
    #[must_use]
    pub fn from_tree(tree: DiscoveryTree) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    /// Register a strategy
    ///
    /// # Errors
    ///
    /// See [`DiscoveryTree::insert`].
    pub fn register(&self, registration: ServiceRegistration) -> Result<(), ApplicationError> {
        let key = registration.key.clone();
        let strategy = registration.strategy.clone();
        self.tree.write().insert(registration)?;
        info!(service = %key, strategy = %strategy, "Registered strategy");
        Ok(())
    }

    /// Remove a strategy
    ///
    /// # Errors
    ///
    /// See [`DiscoveryTree::remove`].
    pub fn deregister(&self, key: &ServiceKey) -> Result<ServiceRegistration, ApplicationError> {
        let removed = self.tree.write().remove(key)?;
        info!(service = %key, strategy = %removed.strategy, "Deregistered strategy");
        Ok(removed)
    }

    /// Exact lookup
    pub fn lookup(&self, key: &ServiceKey) -> Option<StrategyMatch> {
        self.tree.read().lookup_by_key(key)
    }

    /// Nearest lookup in geomorphic space
    pub fn nearest(&self, target: &GeomorphicCoordinate) -> Option<StrategyMatch> {
        self.tree.read().lookup_nearest(target)
    }

    /// Nearest strategy for a conversion heading in `direction` from
    /// `coordinate`
    ///
    /// Returns `None` when nothing is registered or the closest node serves
    /// the other direction.
    pub fn select(
        &self,
        direction: ConversionDirection,
        coordinate: &Coordinate,
    ) -> Option<StrategyMatch> {
        let target = GeomorphicCoordinate::project(direction, coordinate);
        let selected = self
            .nearest(&target)
            .filter(|hit| hit.key.service() == direction.service());
        debug!(
            %direction,
            target = %target,
            strategy = selected.as_ref().map(|hit| hit.strategy.as_str()),
            "Strategy selection"
        );
        selected
    }

    /// Change the balancing mode; restructuring happens on the next write
    pub fn set_mode(&self, mode: TreeMode) {
        self.tree.write().set_mode(mode);
    }

    /// Override or release the hybrid read share
    ///
    /// # Errors
    ///
    /// See [`DiscoveryTree::command_read_share`].
    pub fn command_read_share(&self, share: Option<f32>) -> Result<(), ApplicationError> {
        self.tree.write().command_read_share(share)
    }

    /// Configured mode
    pub fn mode(&self) -> TreeMode {
        self.tree.read().mode()
    }

    /// Discipline currently stamped on the nodes
    pub fn discipline(&self) -> Discipline {
        self.tree.read().discipline()
    }

    /// Number of registered strategies
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// Height of the tree
    pub fn height(&self) -> u32 {
        self.tree.read().height()
    }

    /// Snapshots of every registered strategy in key order
    pub fn entries(&self) -> Vec<StrategyMatch> {
        self.tree.read().entries()
    }

    /// Check the tree's structural invariants
    ///
    /// # Errors
    ///
    /// See [`DiscoveryTree::verify`].
    pub fn verify(&self) -> Result<(), ApplicationError> {
        self.tree.read().verify()
    }
}
