//! Fluent views over list fields.
//!
//! A [`ListAccessor`] forwards every read and write to the stored sequence of its
//! *target* node and reports its *owner* from every fluent call. Owner and target are the
//! same node for ordinary list fields; derived accessors such as
//! [`derived::generics`](crate::derived::generics) bind a nested list to an outer owner.

use log::trace;
use serde::Serialize;

use super::{check_data_value, NodeId, Slot, Tree};
use crate::errors::{Result, TrellisError};
use crate::schema::DataValue;

/// Where a list accessor points: `target.field`, reported as belonging to `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ListBinding {
    pub owner: NodeId,
    pub target: NodeId,
    pub field: &'static str,
}

impl ListBinding {
    pub fn new(owner: NodeId, target: NodeId, field: &'static str) -> Self {
        Self {
            owner,
            target,
            field,
        }
    }
}

/// Transient, mutation-forwarding view of one list field. Owns none of the elements.
#[derive(Debug)]
pub struct ListAccessor<'t> {
    tree: &'t mut Tree,
    binding: ListBinding,
    index: usize,
}

impl<'t> ListAccessor<'t> {
    pub(crate) fn new(tree: &'t mut Tree, binding: ListBinding, index: usize) -> Self {
        Self {
            tree,
            binding,
            index,
        }
    }

    /// The node every fluent call answers for.
    pub fn owner(&self) -> NodeId {
        self.binding.owner
    }

    pub fn binding(&self) -> ListBinding {
        self.binding
    }

    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    fn kind_name(&self) -> &'static str {
        self.tree.kind_name(self.binding.target)
    }

    fn not_a(&self, what: &str) -> TrellisError {
        TrellisError::contract(
            self.kind_name(),
            self.binding.field,
            format!("field is not a {what} list"),
        )
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        match self.tree.slot(self.binding.target, self.index) {
            Slot::Children(list) => list.len(),
            Slot::DataList(list) => list.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Child elements in order; empty for data lists.
    pub fn contents(&self) -> &[NodeId] {
        match self.tree.slot(self.binding.target, self.index) {
            Slot::Children(list) => list.as_slice(),
            _ => &[],
        }
    }

    /// Data elements in order; empty for child lists.
    pub fn values(&self) -> &[DataValue] {
        match self.tree.slot(self.binding.target, self.index) {
            Slot::DataList(list) => list.as_slice(),
            _ => &[],
        }
    }

    pub fn first(&self) -> Option<NodeId> {
        self.contents().first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.contents().last().copied()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.contents().get(index).copied()
    }

    // ------------------------------------------------------------------------
    // Child list mutation
    // ------------------------------------------------------------------------

    pub fn add_to_end(&mut self, child: NodeId) -> Result<&mut Self> {
        let len = self.len() - usize::from(self.contents().contains(&child));
        self.insert(len, child)
    }

    pub fn add_to_start(&mut self, child: NodeId) -> Result<&mut Self> {
        self.insert(0, child)
    }

    /// Inserts `child` at `index`, detaching it from its previous parent first.
    ///
    /// `index` addresses the list without `child`, so moving an element within the same
    /// list counts positions as if it had already been taken out. A rejected insert
    /// leaves the tree untouched.
    pub fn insert(&mut self, index: usize, child: NodeId) -> Result<&mut Self> {
        let target = self.binding.target;
        if !self.is_child_list() {
            return Err(self.not_a("child"));
        }
        let schema = self.tree.schema_arc();
        let spec = schema.kind(self.tree.kind_id(target));
        self.tree
            .check_attachable(target, &spec.fields[self.index], child)?;

        let len = self.len() - usize::from(self.contents().contains(&child));
        if index > len {
            return Err(TrellisError::contract(
                spec.name,
                self.binding.field,
                format!("index {index} out of bounds for list of length {len}"),
            ));
        }
        self.tree.adopt(target, child);
        if let Slot::Children(list) = self.tree.slot_mut(target, self.index) {
            list.insert(index, child);
        }
        trace!(
            "inserted {} into {}.{} at {}",
            child,
            spec.name,
            self.binding.field,
            index
        );
        Ok(self)
    }

    /// Removes `child` from the list; it becomes a detached root.
    pub fn remove(&mut self, child: NodeId) -> Result<&mut Self> {
        if !self.contents().contains(&child) {
            return Err(TrellisError::contract(
                self.kind_name(),
                self.binding.field,
                format!("{child} is not an element of this list"),
            ));
        }
        self.tree.detach(child);
        Ok(self)
    }

    /// Removes every element, leaving the empty "no value" state.
    pub fn clear(&mut self) -> &mut Self {
        let target = self.binding.target;
        for child in self.contents().to_vec() {
            self.tree.detach(child);
        }
        if let Slot::DataList(list) = self.tree.slot_mut(target, self.index) {
            list.clear();
        }
        self
    }

    // ------------------------------------------------------------------------
    // Data list mutation
    // ------------------------------------------------------------------------

    pub fn push_value(&mut self, value: impl Into<DataValue>) -> Result<&mut Self> {
        let value = value.into();
        let target = self.binding.target;
        if self.is_child_list() {
            return Err(self.not_a("data"));
        }
        let schema = self.tree.schema_arc();
        let spec = schema.kind(self.tree.kind_id(target));
        check_data_value(spec.name, &spec.fields[self.index], Some(&value))?;
        if let Slot::DataList(list) = self.tree.slot_mut(target, self.index) {
            list.push(value);
        }
        Ok(self)
    }

    pub fn remove_value(&mut self, index: usize) -> Result<&mut Self> {
        if self.is_child_list() {
            return Err(self.not_a("data"));
        }
        let len = self.len();
        if index >= len {
            return Err(TrellisError::contract(
                self.kind_name(),
                self.binding.field,
                format!("index {index} out of bounds for list of length {len}"),
            ));
        }
        let target = self.binding.target;
        if let Slot::DataList(list) = self.tree.slot_mut(target, self.index) {
            list.remove(index);
        }
        Ok(self)
    }

    fn is_child_list(&self) -> bool {
        matches!(
            self.tree.slot(self.binding.target, self.index),
            Slot::Children(_)
        )
    }
}
