//! Height-balanced discipline
//!
//! Every node's two subtrees differ in height by at most one. Stored heights
//! count nodes, so a leaf has height 1 and a missing child 0.

use super::arena::NodeArena;
use super::balance::Balancer;
use super::node::{NodeId, Payload};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StrictBalancer;

impl StrictBalancer {
    fn update_height(arena: &mut NodeArena, id: NodeId) {
        let node = &arena[id];
        let height = 1 + arena.height_of(node.left).max(arena.height_of(node.right));
        arena[id].height = height;
    }

    fn balance_factor(arena: &NodeArena, id: NodeId) -> i64 {
        i64::from(arena.height_of(arena[id].left)) - i64::from(arena.height_of(arena[id].right))
    }

    /// Fix the subtree at `id`, returning its new top
    fn rebalance(arena: &mut NodeArena, id: NodeId) -> NodeId {
        Self::update_height(arena, id);
        let factor = Self::balance_factor(arena, id);

        if factor > 1 {
            if let Some(left) = arena[id].left {
                if Self::balance_factor(arena, left) < 0 {
                    let top = arena.rotate_left(left);
                    Self::update_height(arena, left);
                    Self::update_height(arena, top);
                }
            }
            let top = arena.rotate_right(id);
            Self::update_height(arena, id);
            Self::update_height(arena, top);
            top
        } else if factor < -1 {
            if let Some(right) = arena[id].right {
                if Self::balance_factor(arena, right) > 0 {
                    let top = arena.rotate_right(right);
                    Self::update_height(arena, right);
                    Self::update_height(arena, top);
                }
            }
            let top = arena.rotate_left(id);
            Self::update_height(arena, id);
            Self::update_height(arena, top);
            top
        } else {
            id
        }
    }

    /// Walk from `start` to the root, rebalancing every ancestor
    fn retrace(arena: &mut NodeArena, start: Option<NodeId>) {
        let mut current = start;
        while let Some(id) = current {
            let top = Self::rebalance(arena, id);
            current = arena[top].parent;
        }
    }
}

impl Balancer for StrictBalancer {
    fn after_insert(&self, arena: &mut NodeArena, inserted: NodeId) {
        arena[inserted].height = 1;
        Self::retrace(arena, arena[inserted].parent);
    }

    fn remove(&self, arena: &mut NodeArena, target: NodeId) -> Option<Payload> {
        let unlinked = arena.unlink(target);
        let payload = arena.release(unlinked.node);
        Self::retrace(arena, unlinked.parent);
        payload
    }

    fn verify(&self, arena: &NodeArena) -> Result<(), String> {
        for (_, node) in arena.iter() {
            let left = arena.height_of(node.left);
            let right = arena.height_of(node.right);
            if node.height != 1 + left.max(right) {
                return Err(format!("stale height {} at {}", node.height, node.payload.key));
            }
            if left.abs_diff(right) > 1 {
                return Err(format!(
                    "height imbalance {left}/{right} at {}",
                    node.payload.key
                ));
            }
        }
        Ok(())
    }
}
