//! Node construction.
//!
//! A [`NodeBuilder`] collects field assignments and checks all of them before anything is
//! allocated, so a rejected build leaves the tree untouched. Required single fields without
//! an initial value act as constructor parameters: leaving one out fails the build.

use std::collections::HashSet;

use log::debug;

use super::{check_accepts, check_data_value, decode_raw_form, NodeId, Tree};
use crate::errors::{Result, TrellisError};
use crate::schema::{DataValue, FieldCategory, ResolvedField};

#[derive(Debug, Clone)]
enum Assignment {
    Child(&'static str, NodeId),
    Children(&'static str, Vec<NodeId>),
    Data(&'static str, DataValue),
    Raw(&'static str, String),
    Values(&'static str, Vec<DataValue>),
}

impl Assignment {
    fn field(&self) -> &'static str {
        match self {
            Assignment::Child(f, _)
            | Assignment::Children(f, _)
            | Assignment::Data(f, _)
            | Assignment::Raw(f, _)
            | Assignment::Values(f, _) => f,
        }
    }

    fn category(&self) -> FieldCategory {
        match self {
            Assignment::Child(..) => FieldCategory::SingleChild,
            Assignment::Children(..) => FieldCategory::ListChild,
            Assignment::Data(..) | Assignment::Raw(..) => FieldCategory::SingleData,
            Assignment::Values(..) => FieldCategory::ListData,
        }
    }
}

/// Fluent construction of one node.
///
/// # Examples
///
/// ```rust
/// use trellis::Tree;
/// fn name(tree: &mut Tree, text: &str) -> trellis::NodeId {
///     let id = tree.build("Identifier").data("name", text).finish().unwrap();
///     tree.build("IdentifierExpression").child("identifier", id).finish().unwrap()
/// }
/// let mut tree = Tree::standard().unwrap();
/// let a = name(&mut tree, "a");
/// let b = name(&mut tree, "b");
/// let sum = tree
///     .build("BinaryExpression")
///     .child("left", a)
///     .child("right", b)
///     .raw("operator", "+")
///     .finish()
///     .unwrap();
/// assert_eq!(tree.raw_form(sum, "operator").unwrap().as_deref(), Some("+"));
/// assert_eq!(tree.parent(a), Some(sum));
/// ```
pub struct NodeBuilder<'t> {
    tree: &'t mut Tree,
    kind: String,
    assignments: Vec<Assignment>,
}

impl<'t> NodeBuilder<'t> {
    pub(crate) fn new(tree: &'t mut Tree, kind: &str) -> Self {
        Self {
            tree,
            kind: kind.to_string(),
            assignments: Vec::new(),
        }
    }

    pub fn child(mut self, field: &'static str, child: impl Into<NodeId>) -> Self {
        self.assignments.push(Assignment::Child(field, child.into()));
        self
    }

    /// Assigns `child` when present; `None` leaves the field at its initial state.
    pub fn maybe_child(self, field: &'static str, child: Option<NodeId>) -> Self {
        match child {
            Some(child) => self.child(field, child),
            None => self,
        }
    }

    pub fn children<I>(mut self, field: &'static str, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        let children = children.into_iter().map(Into::into).collect();
        self.assignments.push(Assignment::Children(field, children));
        self
    }

    pub fn data(mut self, field: &'static str, value: impl Into<DataValue>) -> Self {
        self.assignments.push(Assignment::Data(field, value.into()));
        self
    }

    /// Assigns a data field from its text form through the field's raw-form codec.
    pub fn raw(mut self, field: &'static str, text: &str) -> Self {
        self.assignments.push(Assignment::Raw(field, text.to_string()));
        self
    }

    pub fn values<I>(mut self, field: &'static str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<DataValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.assignments.push(Assignment::Values(field, values));
        self
    }

    /// Checks every assignment, then allocates the node and applies them in order.
    ///
    /// # Errors
    /// - `ContractViolation` for an unknown kind or field, a rejected child or data type,
    ///   or a required field left absent.
    /// - `MalformedRawForm` when a raw text does not decode.
    pub fn finish(self) -> Result<NodeId> {
        let Self {
            tree,
            kind,
            assignments,
        } = self;
        let schema = tree.schema_arc();
        let kind_id = schema
            .kind_id(&kind)
            .ok_or_else(|| TrellisError::contract(kind.as_str(), "*", "unknown node kind"))?;
        let spec = schema.kind(kind_id);

        // Everything is checked before allocation.
        let mut assigned = HashSet::new();
        let mut placed = HashSet::new();
        let mut decoded = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let (index, resolved) =
                Tree::resolve(&schema, kind_id, assignment.field(), &[assignment.category()])?;
            assigned.insert(index);
            let assignment = match assignment {
                Assignment::Child(_, child) => {
                    check_accepts(&schema, spec.name, resolved, tree.kind_id(child))?;
                    place_once(&mut placed, spec.name, resolved, child)?;
                    Assignment::Child(resolved.name(), child)
                }
                Assignment::Children(_, children) => {
                    for &child in &children {
                        check_accepts(&schema, spec.name, resolved, tree.kind_id(child))?;
                        place_once(&mut placed, spec.name, resolved, child)?;
                    }
                    Assignment::Children(resolved.name(), children)
                }
                Assignment::Data(_, value) => {
                    check_data_value(spec.name, resolved, Some(&value))?;
                    Assignment::Data(resolved.name(), value)
                }
                Assignment::Raw(_, text) => {
                    let value = decode_raw_form(&schema, kind_id, resolved.name(), Some(text.as_str()))?;
                    Assignment::Data(resolved.name(), value)
                }
                Assignment::Values(_, values) => {
                    for value in &values {
                        check_data_value(spec.name, resolved, Some(value))?;
                    }
                    Assignment::Values(resolved.name(), values)
                }
            };
            decoded.push(assignment);
        }

        for (index, field) in spec.fields.iter().enumerate() {
            let needs_value = field.field.required
                && !field.field.is_list()
                && field.field.initial.is_none();
            if needs_value && !assigned.contains(&index) {
                return Err(TrellisError::contract(
                    spec.name,
                    field.name(),
                    "required field cannot be absent",
                ));
            }
        }

        let id = tree.alloc(kind_id);
        for assignment in decoded {
            match assignment {
                Assignment::Child(field, child) => tree.set_child(id, field, Some(child))?,
                Assignment::Children(field, children) => {
                    let mut list = tree.list(id, field)?;
                    for child in children {
                        list.add_to_end(child)?;
                    }
                }
                Assignment::Data(field, value) => tree.set_data(id, field, Some(value))?,
                Assignment::Values(field, values) => {
                    let mut list = tree.list(id, field)?;
                    for value in values {
                        list.push_value(value)?;
                    }
                }
                Assignment::Raw(..) => {}
            }
        }

        debug!("built {} {}", spec.name, id);
        Ok(id)
    }
}

/// A node has one parent, so each child may appear in only one assignment.
fn place_once(
    placed: &mut HashSet<NodeId>,
    kind: &str,
    field: &ResolvedField,
    child: NodeId,
) -> Result<()> {
    if placed.insert(child) {
        Ok(())
    } else {
        Err(TrellisError::contract(
            kind,
            field.name(),
            format!("{child} is assigned more than once"),
        ))
    }
}
