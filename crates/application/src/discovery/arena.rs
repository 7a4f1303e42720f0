//! Node arena and the structural primitives shared by both disciplines

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

use domain::ServiceKey;

use super::node::{Color, DiscoveryNode, NodeId, Payload};

/// Outcome of [`NodeArena::unlink`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct Unlinked {
    /// Spliced-out node, still holding its slot
    pub(crate) node: NodeId,
    /// Child that took the node's place
    pub(crate) child: Option<NodeId>,
    /// Former parent of the spliced-out node
    pub(crate) parent: Option<NodeId>,
    /// Colour the spliced-out node had
    pub(crate) color: Color,
}

/// Slots of nodes addressed by [`NodeId`], plus the root link
///
/// Freed slots are recycled. A handle is only valid while its node is
/// linked into the tree; indexing a freed slot is a logic error.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Option<DiscoveryNode>>,
    free: Vec<usize>,
    pub(crate) root: Option<NodeId>,
    len: usize,
}

impl Index<NodeId> for NodeArena {
    type Output = DiscoveryNode;

    fn index(&self, id: NodeId) -> &Self::Output {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => unreachable!("stale discovery node handle {}", id.0),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => unreachable!("stale discovery node handle {}", id.0),
        }
    }
}

impl NodeArena {
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Store a detached node and return its handle
    pub(crate) fn alloc(&mut self, payload: Payload, parent: Option<NodeId>) -> NodeId {
        let node = DiscoveryNode::new(payload, parent);
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(node);
            NodeId(slot)
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    /// Release a node that is no longer linked and return its payload
    pub(crate) fn release(&mut self, id: NodeId) -> Option<Payload> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.payload)
    }

    /// All live nodes in slot order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &DiscoveryNode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (NodeId(i), node)))
    }

    /// Exchange the payloads of two live nodes, leaving links untouched
    pub(crate) fn swap_payload(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.slots.split_at_mut(hi);
        if let (Some(Some(x)), Some(Some(y))) = (head.get_mut(lo), tail.first_mut()) {
            std::mem::swap(&mut x.payload, &mut y.payload);
        }
    }

    /// Find the node holding `key`
    pub(crate) fn find(&self, key: &ServiceKey) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            current = match key.cmp(&self[id].payload.key) {
                Ordering::Less => self[id].left,
                Ordering::Greater => self[id].right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Attach a new leaf at its ordered position
    ///
    /// Returns `None` if the key is already present.
    pub(crate) fn insert_leaf(&mut self, payload: Payload) -> Option<NodeId> {
        let mut parent = None;
        let mut go_left = false;
        let mut current = self.root;
        while let Some(id) = current {
            parent = Some(id);
            match payload.key.cmp(&self[id].payload.key) {
                Ordering::Less => {
                    go_left = true;
                    current = self[id].left;
                },
                Ordering::Greater => {
                    go_left = false;
                    current = self[id].right;
                },
                Ordering::Equal => return None,
            }
        }

        let id = self.alloc(payload, parent);
        match parent {
            None => self.root = Some(id),
            Some(p) if go_left => self[p].left = Some(id),
            Some(p) => self[p].right = Some(id),
        }
        Some(id)
    }

    pub(crate) fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self[id].left {
            id = left;
        }
        id
    }

    /// Put `replacement` where `target` hangs from its parent
    ///
    /// `target`'s own links are left as they were.
    pub(crate) fn transplant(&mut self, target: NodeId, replacement: Option<NodeId>) {
        let parent = self[target].parent;
        match parent {
            None => self.root = replacement,
            Some(p) if self[p].left == Some(target) => self[p].left = replacement,
            Some(p) => self[p].right = replacement,
        }
        if let Some(r) = replacement {
            self[r].parent = parent;
        }
    }

    /// Left rotation around `x`; `x` must have a right child
    pub(crate) fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self[x].right else {
            return x;
        };
        let inner = self[y].left;
        self[x].right = inner;
        if let Some(inner) = inner {
            self[inner].parent = Some(x);
        }
        self.transplant(x, Some(y));
        self[y].left = Some(x);
        self[x].parent = Some(y);
        y
    }

    /// Right rotation around `x`; `x` must have a left child
    pub(crate) fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self[x].left else {
            return x;
        };
        let inner = self[y].right;
        self[x].left = inner;
        if let Some(inner) = inner {
            self[inner].parent = Some(x);
        }
        self.transplant(x, Some(y));
        self[y].right = Some(x);
        self[x].parent = Some(y);
        y
    }

    /// Detach the node carrying `target`'s payload
    ///
    /// A node with two children first trades payloads with its in-order
    /// successor, so the node actually spliced out has at most one child.
    /// The returned node is unlinked but still allocated; its payload is the
    /// one that was asked for.
    pub(crate) fn unlink(&mut self, target: NodeId) -> Unlinked {
        let node = match (self[target].left, self[target].right) {
            (Some(_), Some(right)) => {
                let successor = self.minimum(right);
                self.swap_payload(target, successor);
                successor
            },
            _ => target,
        };
        let child = self[node].left.or(self[node].right);
        let parent = self[node].parent;
        let color = self[node].color;
        self.transplant(node, child);
        Unlinked {
            node,
            child,
            parent,
            color,
        }
    }

    pub(crate) fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |id| self[id].height)
    }

    pub(crate) fn color_of(&self, id: Option<NodeId>) -> Color {
        id.map_or(Color::Black, |id| self[id].color)
    }

    /// Node handles in key order
    pub(crate) fn in_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self[id].left;
            }
            if let Some(id) = stack.pop() {
                order.push(id);
                current = self[id].right;
            }
        }
        order
    }

    /// Number of nodes on the longest root-to-leaf path
    pub(crate) fn measured_height(&self) -> u32 {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, u32)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for child in [self[id].left, self[id].right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        deepest
    }

    /// Relink every node into a size-balanced shape
    ///
    /// Key order is preserved; slots are reused. Heights are recomputed and
    /// colours assigned so the result satisfies both disciplines: nodes on
    /// the deepest level are red (unless that level is the root), all
    /// others black.
    pub(crate) fn relink_balanced(&mut self) {
        let order = self.in_order();
        let root = self.build_balanced(&order, None);
        self.root = root;

        let max_depth = self.measured_height().saturating_sub(1);
        let mut stack: Vec<(NodeId, u32)> = root.map(|r| (r, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            self[id].color = if depth == max_depth && max_depth > 0 {
                Color::Red
            } else {
                Color::Black
            };
            for child in [self[id].left, self[id].right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
    }

    fn build_balanced(&mut self, order: &[NodeId], parent: Option<NodeId>) -> Option<NodeId> {
        if order.is_empty() {
            return None;
        }
        let mid = order.len() / 2;
        let id = order[mid];
        self[id].parent = parent;
        let left = self.build_balanced(&order[..mid], Some(id));
        let right = self.build_balanced(&order[mid + 1..], Some(id));
        self[id].left = left;
        self[id].right = right;
        self[id].height = 1 + self.height_of(left).max(self.height_of(right));
        Some(id)
    }
}
