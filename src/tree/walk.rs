//! Generic child traversal, deep copy and structural equality.
//!
//! All three are derived from the child fields of each kind, in declaration order. Data
//! fields are never traversed: a copy clones them by value and equality ignores them.

use log::trace;

use super::{Node, NodeId, Slot, Tree};

/// Pre-order iterator over a subtree.
pub struct Walk<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Walk<'t> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.child_nodes(id).into_iter().rev());
        Some(id)
    }
}

impl Tree {
    /// Present children of `id`: single children, then list elements, per field in
    /// declaration order.
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for slot in &self.node(id).slots {
            match slot {
                Slot::Child(Some(child)) => out.push(*child),
                Slot::Children(list) => out.extend(list.iter().copied()),
                _ => {}
            }
        }
        out
    }

    /// Visits `root` and every descendant, parents before children.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trellis::Tree;
    /// let mut tree = Tree::standard().unwrap();
    /// let a = tree.build("EmptyStatement").finish().unwrap();
    /// let inner = tree.build("Block").children("contents", [a]).finish().unwrap();
    /// let outer = tree.build("Block").children("contents", [inner]).finish().unwrap();
    /// assert_eq!(tree.walk(outer).collect::<Vec<_>>(), vec![outer, inner, a]);
    /// ```
    pub fn walk(&self, root: NodeId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![root],
        }
    }

    /// Copies the subtree rooted at `id`. The copy is detached and shares no nodes with
    /// the source.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let source = self.node(id).clone();
        let copy = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: source.kind,
            parent: None,
            slots: Vec::new(),
        });

        let mut slots = Vec::with_capacity(source.slots.len());
        for slot in source.slots {
            let slot = match slot {
                Slot::Child(Some(child)) => Slot::Child(Some(self.copy_under(child, copy))),
                Slot::Children(list) => {
                    let mut copied = Vec::with_capacity(list.len());
                    for child in list {
                        copied.push(self.copy_under(child, copy));
                    }
                    Slot::Children(copied)
                }
                data => data,
            };
            slots.push(slot);
        }
        self.node_mut(copy).slots = slots;
        trace!("copied {} to {}", id, copy);
        copy
    }

    fn copy_under(&mut self, child: NodeId, parent: NodeId) -> NodeId {
        let copy = self.deep_copy(child);
        self.node_mut(copy).parent = Some(parent);
        copy
    }

    /// Same kinds and same child topology. Data fields are not consulted.
    pub fn structurally_equal(&self, a: NodeId, b: NodeId) -> bool {
        let (left, right) = (self.node(a), self.node(b));
        if left.kind != right.kind {
            return false;
        }
        left.slots
            .iter()
            .zip(&right.slots)
            .all(|pair| match pair {
                (Slot::Child(x), Slot::Child(y)) => match (x, y) {
                    (Some(x), Some(y)) => self.structurally_equal(*x, *y),
                    (None, None) => true,
                    _ => false,
                },
                (Slot::Children(xs), Slot::Children(ys)) => {
                    xs.len() == ys.len()
                        && xs
                            .iter()
                            .zip(ys)
                            .all(|(x, y)| self.structurally_equal(*x, *y))
                }
                _ => true,
            })
    }
}
