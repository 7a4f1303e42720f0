//! Balancing disciplines
//!
//! A [`Balancer`] owns the rebalancing half of every structural mutation.
//! The arena does the plain binary-search-tree work; the balancer restores
//! its own invariant afterwards and can check it on demand.

use std::fmt;

use domain::TreeMode;

use super::arena::NodeArena;
use super::node::{NodeId, Payload};
use super::relaxed::RelaxedBalancer;
use super::strict::StrictBalancer;

/// Concrete discipline the tree's metadata is stamped with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discipline {
    /// Height balanced
    Strict,
    /// Colour balanced
    Relaxed,
}

impl Discipline {
    /// The mode that pins the tree to this discipline
    #[must_use]
    pub const fn as_mode(self) -> TreeMode {
        match self {
            Self::Strict => TreeMode::Strict,
            Self::Relaxed => TreeMode::Relaxed,
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_mode(), f)
    }
}

/// Rebalancing capability of one discipline
pub(crate) trait Balancer: Send + Sync {
    /// Restore the invariant after `inserted` was attached as a leaf
    fn after_insert(&self, arena: &mut NodeArena, inserted: NodeId);

    /// Remove `target` and restore the invariant, returning its payload
    fn remove(&self, arena: &mut NodeArena, target: NodeId) -> Option<Payload>;

    /// Check the discipline's invariant over the whole arena
    fn verify(&self, arena: &NodeArena) -> Result<(), String>;
}

static STRICT: StrictBalancer = StrictBalancer;
static RELAXED: RelaxedBalancer = RelaxedBalancer;

/// Balancer implementing `discipline`
pub(crate) fn balancer_for(discipline: Discipline) -> &'static dyn Balancer {
    match discipline {
        Discipline::Strict => &STRICT,
        Discipline::Relaxed => &RELAXED,
    }
}
