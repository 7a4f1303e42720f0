//! Colour-balanced discipline
//!
//! No red node has a red child and every root-to-leaf path crosses the same
//! number of black nodes. Missing children count as black.

use super::arena::NodeArena;
use super::balance::Balancer;
use super::node::{Color, NodeId, Payload};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RelaxedBalancer;

impl RelaxedBalancer {
    fn is_red(arena: &NodeArena, id: Option<NodeId>) -> bool {
        arena.color_of(id) == Color::Red
    }

    fn sibling(arena: &NodeArena, parent: NodeId, of_left: bool) -> Option<NodeId> {
        if of_left {
            arena[parent].right
        } else {
            arena[parent].left
        }
    }

    fn insert_fixup(arena: &mut NodeArena, mut z: NodeId) {
        while let Some(parent) = arena[z].parent {
            if arena[parent].color == Color::Black {
                break;
            }
            let Some(grandparent) = arena[parent].parent else {
                break;
            };
            let parent_is_left = arena[grandparent].left == Some(parent);
            let uncle = if parent_is_left {
                arena[grandparent].right
            } else {
                arena[grandparent].left
            };

            if let Some(uncle) = uncle.filter(|&u| arena[u].color == Color::Red) {
                arena[parent].color = Color::Black;
                arena[uncle].color = Color::Black;
                arena[grandparent].color = Color::Red;
                z = grandparent;
                continue;
            }

            let mut parent = parent;
            if parent_is_left && arena[parent].right == Some(z) {
                z = parent;
                arena.rotate_left(z);
                parent = arena[z].parent.unwrap_or(grandparent);
            } else if !parent_is_left && arena[parent].left == Some(z) {
                z = parent;
                arena.rotate_right(z);
                parent = arena[z].parent.unwrap_or(grandparent);
            }

            arena[parent].color = Color::Black;
            arena[grandparent].color = Color::Red;
            if parent_is_left {
                arena.rotate_right(grandparent);
            } else {
                arena.rotate_left(grandparent);
            }
            break;
        }

        if let Some(root) = arena.root {
            arena[root].color = Color::Black;
        }
    }

    /// Restore the black height after a black node was spliced out
    ///
    /// `x` is the node that took its place (possibly none) and `parent` the
    /// position it hangs from.
    fn delete_fixup(arena: &mut NodeArena, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != arena.root && !Self::is_red(arena, x) {
            let Some(p) = parent else {
                break;
            };
            let x_is_left = arena[p].left == x;
            let Some(mut w) = Self::sibling(arena, p, x_is_left) else {
                break;
            };

            if arena[w].color == Color::Red {
                arena[w].color = Color::Black;
                arena[p].color = Color::Red;
                if x_is_left {
                    arena.rotate_left(p);
                } else {
                    arena.rotate_right(p);
                }
                let Some(next) = Self::sibling(arena, p, x_is_left) else {
                    break;
                };
                w = next;
            }

            let (near, far) = if x_is_left {
                (arena[w].left, arena[w].right)
            } else {
                (arena[w].right, arena[w].left)
            };

            if !Self::is_red(arena, near) && !Self::is_red(arena, far) {
                arena[w].color = Color::Red;
                x = Some(p);
                parent = arena[p].parent;
                continue;
            }

            if !Self::is_red(arena, far) {
                if let Some(near) = near {
                    arena[near].color = Color::Black;
                }
                arena[w].color = Color::Red;
                if x_is_left {
                    arena.rotate_right(w);
                } else {
                    arena.rotate_left(w);
                }
                let Some(next) = Self::sibling(arena, p, x_is_left) else {
                    break;
                };
                w = next;
            }

            arena[w].color = arena[p].color;
            arena[p].color = Color::Black;
            let far = if x_is_left {
                arena[w].right
            } else {
                arena[w].left
            };
            if let Some(far) = far {
                arena[far].color = Color::Black;
            }
            if x_is_left {
                arena.rotate_left(p);
            } else {
                arena.rotate_right(p);
            }
            x = arena.root;
            parent = None;
        }

        if let Some(x) = x {
            arena[x].color = Color::Black;
        }
    }

    /// Black height of the subtree at `id`, or an error naming the breach
    fn black_height(arena: &NodeArena, id: Option<NodeId>) -> Result<u32, String> {
        let Some(id) = id else {
            return Ok(1);
        };
        let node = &arena[id];
        if node.color == Color::Red
            && (Self::is_red(arena, node.left) || Self::is_red(arena, node.right))
        {
            return Err(format!("red node {} has a red child", node.payload.key));
        }
        let left = Self::black_height(arena, node.left)?;
        let right = Self::black_height(arena, node.right)?;
        if left != right {
            return Err(format!(
                "black height {left}/{right} differs below {}",
                node.payload.key
            ));
        }
        Ok(left + u32::from(node.color == Color::Black))
    }
}

impl Balancer for RelaxedBalancer {
    fn after_insert(&self, arena: &mut NodeArena, inserted: NodeId) {
        arena[inserted].color = Color::Red;
        Self::insert_fixup(arena, inserted);
    }

    fn remove(&self, arena: &mut NodeArena, target: NodeId) -> Option<Payload> {
        let unlinked = arena.unlink(target);
        let payload = arena.release(unlinked.node);
        if unlinked.color == Color::Black {
            Self::delete_fixup(arena, unlinked.child, unlinked.parent);
        }
        payload
    }

    fn verify(&self, arena: &NodeArena) -> Result<(), String> {
        if Self::is_red(arena, arena.root) {
            return Err("root is red".to_string());
        }
        Self::black_height(arena, arena.root).map(|_| ())
    }
}
