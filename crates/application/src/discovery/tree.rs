//! Adaptive discovery tree
//!
//! Strategies are keyed by `(service, operation)` and can also be found by
//! geomorphic proximity. The balancing discipline follows the configured
//! [`TreeMode`]; in hybrid mode it follows the read/write mix.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use domain::{GeomorphicCoordinate, ServiceKey, ServiceRegistration, TreeMode};
use tracing::debug;

use super::arena::NodeArena;
use super::balance::{Discipline, balancer_for};
use super::node::{Payload, StrategyMatch};
use crate::error::ApplicationError;

/// Read share at or above which hybrid mode picks the strict discipline
pub const DEFAULT_HYBRID_READ_BIAS: f32 = 0.5;

/// Ordered strategy index with a switchable balancing discipline
pub struct DiscoveryTree {
    arena: NodeArena,
    mode: TreeMode,
    /// Discipline the node metadata currently satisfies
    stamped: Discipline,
    read_bias: f32,
    commanded_read_share: Option<f32>,
    reads: AtomicU64,
    writes: u64,
    next_sequence: u64,
}

impl fmt::Debug for DiscoveryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryTree")
            .field("mode", &self.mode)
            .field("stamped", &self.stamped)
            .field("len", &self.arena.len())
            .field("reads", &self.reads.load(Ordering::Relaxed))
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

impl Default for DiscoveryTree {
    fn default() -> Self {
        Self::new(TreeMode::default())
    }
}

impl DiscoveryTree {
    /// Create an empty tree in `mode`
    #[must_use]
    pub fn new(mode: TreeMode) -> Self {
        let stamped = match mode {
            TreeMode::Strict => Discipline::Strict,
            TreeMode::Relaxed | TreeMode::Hybrid => Discipline::Relaxed,
        };
        Self {
            arena: NodeArena::default(),
            mode,
            stamped,
            read_bias: DEFAULT_HYBRID_READ_BIAS,
            commanded_read_share: None,
            reads: AtomicU64::new(0),
            writes: 0,
            next_sequence: 0,
        }
    }

    /// Set the hybrid read bias
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidInput` if `bias` is outside `[0, 1]`.
    pub fn with_read_bias(mut self, bias: f32) -> Result<Self, ApplicationError> {
        if !(0.0..=1.0).contains(&bias) {
            return Err(ApplicationError::InvalidInput(format!(
                "hybrid read bias {bias} must be within [0, 1]"
            )));
        }
        self.read_bias = bias;
        Ok(self)
    }

    /// Configured mode
    #[must_use]
    pub const fn mode(&self) -> TreeMode {
        self.mode
    }

    /// Discipline the nodes are currently balanced under
    #[must_use]
    pub const fn discipline(&self) -> Discipline {
        self.stamped
    }

    /// Change the mode
    ///
    /// Nodes are restructured lazily, on the next insert or remove.
    pub fn set_mode(&mut self, mode: TreeMode) {
        if mode != self.mode {
            debug!(from = %self.mode, to = %mode, "Discovery tree mode changed");
            self.mode = mode;
        }
    }

    /// Override the observed read share used by hybrid mode
    ///
    /// `None` returns to the observed share.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidInput` if the share is outside
    /// `[0, 1]`.
    pub fn command_read_share(&mut self, share: Option<f32>) -> Result<(), ApplicationError> {
        if let Some(share) = share {
            if !(0.0..=1.0).contains(&share) {
                return Err(ApplicationError::InvalidInput(format!(
                    "read share {share} must be within [0, 1]"
                )));
            }
        }
        self.commanded_read_share = share;
        Ok(())
    }

    /// Commanded read share, or the observed one
    #[must_use]
    pub fn read_share(&self) -> f32 {
        if let Some(share) = self.commanded_read_share {
            return share;
        }
        let reads = self.reads.load(Ordering::Relaxed);
        let total = reads.saturating_add(self.writes);
        if total == 0 {
            0.0
        } else {
            (reads as f64 / total as f64) as f32
        }
    }

    /// Number of registered strategies
    #[must_use]
    pub const fn len(&self) -> usize {
        self.arena.len()
    }

    /// Check if nothing is registered
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Nodes on the longest root-to-leaf path, 0 when empty
    #[must_use]
    pub fn height(&self) -> u32 {
        self.arena.measured_height()
    }

    /// Register a strategy
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Duplicate` if the key is taken, or a domain
    /// error if the registration's cost or confidence is invalid.
    pub fn insert(&mut self, registration: ServiceRegistration) -> Result<(), ApplicationError> {
        registration.validate()?;
        if self.arena.find(&registration.key).is_some() {
            return Err(ApplicationError::Duplicate(format!(
                "service {}",
                registration.key
            )));
        }

        let discipline = self.prepare_mutation();
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let key = registration.key.clone();
        let payload = Payload::new(registration, sequence);
        let Some(id) = self.arena.insert_leaf(payload) else {
            return Err(ApplicationError::Duplicate(format!("service {key}")));
        };
        balancer_for(discipline).after_insert(&mut self.arena, id);
        debug!(service = %key, %discipline, len = self.arena.len(), "Strategy registered");
        Ok(())
    }

    /// Deregister a strategy and return its registration
    ///
    /// The returned cost reflects every decay applied while it was live.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if the key is not registered.
    pub fn remove(&mut self, key: &ServiceKey) -> Result<ServiceRegistration, ApplicationError> {
        if self.arena.find(key).is_none() {
            return Err(ApplicationError::NotFound(format!("service {key}")));
        }
        let discipline = self.prepare_mutation();
        // the relink keeps every node, so the key is still there
        let payload = self
            .arena
            .find(key)
            .and_then(|id| balancer_for(discipline).remove(&mut self.arena, id))
            .ok_or_else(|| ApplicationError::NotFound(format!("service {key}")))?;
        debug!(service = %key, %discipline, len = self.arena.len(), "Strategy deregistered");
        Ok(payload.into_registration())
    }

    /// Exact lookup; counts an access on the node
    pub fn lookup_by_key(&self, key: &ServiceKey) -> Option<StrategyMatch> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let id = self.arena.find(key)?;
        let payload = &self.arena[id].payload;
        payload.metrics.record_access();
        Some(payload.snapshot())
    }

    /// Closest strategy to `target` by squared Euclidean distance
    ///
    /// Ties go to the most accessed node, then to the earliest registered.
    /// The winner counts an access.
    pub fn lookup_nearest(&self, target: &GeomorphicCoordinate) -> Option<StrategyMatch> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let (_, winner) = self
            .arena
            .iter()
            .map(|(_, node)| {
                let payload = &node.payload;
                let rank = (
                    payload.coordinate.distance_squared(target),
                    std::cmp::Reverse(payload.metrics.access_frequency()),
                    payload.sequence,
                );
                (rank, payload)
            })
            .min_by(|a, b| a.0.cmp(&b.0))?;
        winner.metrics.record_access();
        Some(winner.snapshot())
    }

    /// Snapshots of every node in key order, without counting accesses
    #[must_use]
    pub fn entries(&self) -> Vec<StrategyMatch> {
        self.arena
            .in_order()
            .into_iter()
            .map(|id| self.arena[id].payload.snapshot())
            .collect()
    }

    /// Check ordering, links and the stamped discipline's invariant
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidOperation` naming the first breach.
    pub fn verify(&self) -> Result<(), ApplicationError> {
        let order = self.arena.in_order();
        if order.len() != self.arena.len() {
            return Err(ApplicationError::InvalidOperation(format!(
                "{} nodes reachable of {}",
                order.len(),
                self.arena.len()
            )));
        }
        for pair in order.windows(2) {
            if self.arena[pair[0]].payload.key >= self.arena[pair[1]].payload.key {
                return Err(ApplicationError::InvalidOperation(format!(
                    "keys out of order at {}",
                    self.arena[pair[1]].payload.key
                )));
            }
        }
        for (id, node) in self.arena.iter() {
            for child in [node.left, node.right].into_iter().flatten() {
                if self.arena[child].parent != Some(id) {
                    return Err(ApplicationError::InvalidOperation(format!(
                        "broken parent link below {}",
                        node.payload.key
                    )));
                }
            }
        }
        balancer_for(self.stamped)
            .verify(&self.arena)
            .map_err(ApplicationError::InvalidOperation)
    }

    fn target_discipline(&self) -> Discipline {
        match self.mode {
            TreeMode::Strict => Discipline::Strict,
            TreeMode::Relaxed => Discipline::Relaxed,
            TreeMode::Hybrid if self.read_share() >= self.read_bias => Discipline::Strict,
            TreeMode::Hybrid => Discipline::Relaxed,
        }
    }

    /// Count a write and restamp the nodes if the discipline changed
    fn prepare_mutation(&mut self) -> Discipline {
        self.writes += 1;
        let target = self.target_discipline();
        if target != self.stamped {
            self.arena.relink_balanced();
            debug!(
                from = %self.stamped,
                to = %target,
                len = self.arena.len(),
                "Discovery tree restamped"
            );
            self.stamped = target;
        }
        target
    }
}
