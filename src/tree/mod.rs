//! # Tree Runtime
//!
//! The generated node runtime. A [`Tree`] is an arena of nodes addressed by [`NodeId`];
//! every node stores its kind, a non-owning parent back-reference and one slot per field
//! declared by its [`KindSpec`](crate::schema::KindSpec).
//!
//! ## Invariants
//! - A child has at most one parent. Attaching it elsewhere detaches it first.
//! - A node is never attached beneath itself.
//! - A slot only holds children its declaration accepts and data of its declared type.
//! - Required single fields cannot be cleared through the runtime.
//!
//! ## Concurrency
//! Mutation takes `&mut Tree`; validation and derived accessors take `&Tree`. The borrow
//! checker therefore rules out validating a tree while it is being mutated.

use std::sync::Arc;

use log::trace;

use crate::derived::DerivedValue;
use crate::errors::{Result, TrellisError};
use crate::schema::{
    standard, Accepts, DataValue, Family, FieldCategory, InitialValue, KindId, KindSpec,
    ResolvedField, Schema,
};
use crate::validation::{self, Diagnostic};

pub mod builder;
pub mod list;
pub mod walk;

pub use builder::NodeBuilder;
pub use list::{ListAccessor, ListBinding};
pub use walk::Walk;

/// Stable index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Child(Option<NodeId>),
    Children(Vec<NodeId>),
    Data(Option<DataValue>),
    DataList(Vec<DataValue>),
}

impl Slot {
    fn empty(category: FieldCategory) -> Self {
        match category {
            FieldCategory::SingleChild => Slot::Child(None),
            FieldCategory::ListChild => Slot::Children(Vec::new()),
            FieldCategory::SingleData => Slot::Data(None),
            FieldCategory::ListData => Slot::DataList(Vec::new()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: KindId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) slots: Vec<Slot>,
}

/// Arena of nodes sharing one [`Schema`].
#[derive(Debug, Clone)]
pub struct Tree {
    schema: Arc<Schema>,
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            nodes: Vec::new(),
        }
    }

    /// A tree over the standard C-family schema.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trellis::Tree;
    /// let tree = Tree::standard().unwrap();
    /// assert!(tree.schema().kind_id("If").is_some());
    /// assert!(tree.is_empty());
    /// ```
    pub fn standard() -> Result<Self> {
        Ok(Self::new(standard::schema()?))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_arc(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------------
    // Node identity
    // ------------------------------------------------------------------------

    /// # Panics
    /// Panics if `id` was issued by a different tree.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind_id(&self, id: NodeId) -> KindId {
        self.node(id).kind
    }

    pub fn kind(&self, id: NodeId) -> &KindSpec {
        self.schema.kind(self.node(id).kind)
    }

    pub fn kind_name(&self, id: NodeId) -> &'static str {
        self.kind(id).name
    }

    pub fn family(&self, id: NodeId) -> Option<Family> {
        self.kind(id).family
    }

    pub fn is_statement(&self, id: NodeId) -> bool {
        self.family(id) == Some(Family::Statement)
    }

    pub fn is_expression(&self, id: NodeId) -> bool {
        self.family(id) == Some(Family::Expression)
    }

    /// Non-owning back-reference; `None` for roots and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Starts building a node of the named kind; see [`NodeBuilder`].
    pub fn build(&mut self, kind: &str) -> NodeBuilder<'_> {
        NodeBuilder::new(self, kind)
    }

    /// Allocates a node with empty slots and evaluates initial values.
    ///
    /// Required fields without initial values are left absent; callers go through
    /// [`NodeBuilder`], which refuses to allocate until they are supplied.
    pub(crate) fn alloc(&mut self, kind: KindId) -> NodeId {
        let schema = Arc::clone(&self.schema);
        let spec = schema.kind(kind);
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            slots: spec
                .fields
                .iter()
                .map(|f| Slot::empty(f.classification.category))
                .collect(),
        });

        for (index, field) in spec.fields.iter().enumerate() {
            match (&field.field.initial, field.initial_kind) {
                (Some(InitialValue::Data(value)), _) => {
                    self.node_mut(id).slots[index] = Slot::Data(Some(value.clone()));
                }
                (Some(InitialValue::NewNode(_)), Some(child_kind)) => {
                    let child = self.alloc(child_kind);
                    self.node_mut(child).parent = Some(id);
                    self.node_mut(id).slots[index] = Slot::Child(Some(child));
                }
                _ => {}
            }
        }

        trace!("allocated {} {}", spec.name, id);
        id
    }

    // ------------------------------------------------------------------------
    // Field resolution
    // ------------------------------------------------------------------------

    fn resolve<'s>(
        schema: &'s Schema,
        kind: KindId,
        field: &str,
        expected: &[FieldCategory],
    ) -> Result<(usize, &'s ResolvedField)> {
        let spec = schema.kind(kind);
        let (index, resolved) = spec.field(field).ok_or_else(|| {
            TrellisError::contract(spec.name, field, "node kind has no such field")
        })?;
        let category = resolved.classification.category;
        if !expected.contains(&category) {
            return Err(TrellisError::contract(
                spec.name,
                field,
                format!("field is a {category:?} field"),
            ));
        }
        Ok((index, resolved))
    }

    /// Fails unless `child` may be attached to `parent` through `field`.
    pub(crate) fn check_attachable(
        &self,
        parent: NodeId,
        field: &ResolvedField,
        child: NodeId,
    ) -> Result<()> {
        let parent_kind = self.kind_name(parent);
        check_accepts(&self.schema, parent_kind, field, self.kind_id(child))?;
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(TrellisError::contract(
                parent_kind,
                field.name(),
                format!("attaching {} would create a cycle", child),
            ));
        }
        Ok(())
    }

    /// Removes `child` from whatever slot of its parent holds it.
    pub(crate) fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).parent else {
            return;
        };
        for slot in &mut self.node_mut(parent).slots {
            match slot {
                Slot::Child(held) if *held == Some(child) => *held = None,
                Slot::Children(list) => list.retain(|&c| c != child),
                _ => {}
            }
        }
        self.node_mut(child).parent = None;
        trace!("detached {} from {}", child, parent);
    }

    pub(crate) fn adopt(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        trace!("attached {} to {}", child, parent);
    }

    pub(crate) fn slot(&self, id: NodeId, index: usize) -> &Slot {
        &self.node(id).slots[index]
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId, index: usize) -> &mut Slot {
        &mut self.node_mut(id).slots[index]
    }

    // ------------------------------------------------------------------------
    // Single children
    // ------------------------------------------------------------------------

    pub fn child(&self, id: NodeId, field: &str) -> Result<Option<NodeId>> {
        let (index, _) = Self::resolve(
            &self.schema,
            self.kind_id(id),
            field,
            &[FieldCategory::SingleChild],
        )?;
        match self.slot(id, index) {
            Slot::Child(child) => Ok(*child),
            _ => Ok(None),
        }
    }

    /// Sets or clears a single child field.
    ///
    /// The new child is detached from its previous parent; the replaced child becomes a
    /// detached root.
    ///
    /// # Errors
    /// `ContractViolation` when clearing a required field, when the child's kind or family
    /// is not accepted, or when the child is `id` itself or one of its ancestors.
    pub fn set_child(&mut self, id: NodeId, field: &str, child: Option<NodeId>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let (index, resolved) =
            Self::resolve(&schema, self.kind_id(id), field, &[FieldCategory::SingleChild])?;

        if child.is_none() && resolved.field.required {
            return Err(TrellisError::contract(
                self.kind_name(id),
                field,
                "required field cannot be absent",
            ));
        }
        if let Some(child) = child {
            self.check_attachable(id, resolved, child)?;
        }

        if let Slot::Child(Some(old)) = *self.slot(id, index) {
            self.detach(old);
        }
        if let Some(child) = child {
            self.adopt(id, child);
        }
        *self.slot_mut(id, index) = Slot::Child(child);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------------

    pub fn children(&self, id: NodeId, field: &str) -> Result<&[NodeId]> {
        let (index, _) = Self::resolve(
            &self.schema,
            self.kind_id(id),
            field,
            &[FieldCategory::ListChild],
        )?;
        match self.slot(id, index) {
            Slot::Children(list) => Ok(list.as_slice()),
            _ => Ok(&[][..]),
        }
    }

    pub fn data_list(&self, id: NodeId, field: &str) -> Result<&[DataValue]> {
        let (index, _) = Self::resolve(
            &self.schema,
            self.kind_id(id),
            field,
            &[FieldCategory::ListData],
        )?;
        match self.slot(id, index) {
            Slot::DataList(list) => Ok(list.as_slice()),
            _ => Ok(&[][..]),
        }
    }

    /// A fluent accessor over a list field of `id`, owned by `id`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trellis::Tree;
    /// let mut tree = Tree::standard().unwrap();
    /// let block = tree.build("Block").finish().unwrap();
    /// let a = tree.build("EmptyStatement").finish().unwrap();
    /// let b = tree.build("EmptyStatement").finish().unwrap();
    /// let mut contents = tree.list(block, "contents").unwrap();
    /// let owner = contents.add_to_end(a).unwrap().add_to_end(b).unwrap().owner();
    /// assert_eq!(owner, block);
    /// assert_eq!(tree.children(block, "contents").unwrap(), &[a, b]);
    /// ```
    pub fn list(&mut self, id: NodeId, field: &str) -> Result<ListAccessor<'_>> {
        let binding = ListBinding::new(id, id, self.field_name(id, field)?);
        self.list_binding(binding)
    }

    /// Opens an accessor for a binding, typically one returned by a derived accessor.
    pub fn list_binding(&mut self, binding: ListBinding) -> Result<ListAccessor<'_>> {
        let schema = Arc::clone(&self.schema);
        let (index, _) = Self::resolve(
            &schema,
            self.kind_id(binding.target),
            binding.field,
            &[FieldCategory::ListChild, FieldCategory::ListData],
        )?;
        Ok(ListAccessor::new(self, binding, index))
    }

    /// Interns a field name as the schema's `'static` spelling.
    fn field_name(&self, id: NodeId, field: &str) -> Result<&'static str> {
        self.kind(id)
            .field(field)
            .map(|(_, f)| f.name())
            .ok_or_else(|| {
                TrellisError::contract(self.kind_name(id), field, "node kind has no such field")
            })
    }

    // ------------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------------

    pub fn data(&self, id: NodeId, field: &str) -> Result<Option<&DataValue>> {
        let (index, _) = Self::resolve(
            &self.schema,
            self.kind_id(id),
            field,
            &[FieldCategory::SingleData],
        )?;
        match self.slot(id, index) {
            Slot::Data(value) => Ok(value.as_ref()),
            _ => Ok(None),
        }
    }

    /// Sets or clears a single data field.
    ///
    /// # Errors
    /// `ContractViolation` when clearing a required field or storing a value of another
    /// data type.
    pub fn set_data(&mut self, id: NodeId, field: &str, value: Option<DataValue>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let (index, resolved) =
            Self::resolve(&schema, self.kind_id(id), field, &[FieldCategory::SingleData])?;
        check_data_value(self.kind_name(id), resolved, value.as_ref())?;
        *self.slot_mut(id, index) = Slot::Data(value);
        Ok(())
    }

    /// Text form of a data field through its raw-form codec; `None` when absent.
    pub fn raw_form(&self, id: NodeId, field: &str) -> Result<Option<String>> {
        let (_, resolved) = Self::resolve(
            &self.schema,
            self.kind_id(id),
            field,
            &[FieldCategory::SingleData],
        )?;
        let codec = resolved.field.raw_form.ok_or_else(|| {
            TrellisError::contract(self.kind_name(id), field, "field has no raw-form codec")
        })?;
        let Some(value) = self.data(id, field)? else {
            return Ok(None);
        };
        codec.generate(value).map(Some).ok_or_else(|| {
            TrellisError::contract(
                self.kind_name(id),
                field,
                format!("stored value is not a {}", codec.data_type),
            )
        })
    }

    /// Decodes `text` through the field's raw-form codec and stores the result.
    ///
    /// # Errors
    /// `MalformedRawForm` naming `Kind.field` when the text is absent or unknown.
    pub fn set_raw_form(&mut self, id: NodeId, field: &str, text: Option<&str>) -> Result<()> {
        let value = self.decode_raw_form(id, field, text)?;
        self.set_data(id, field, Some(value))
    }

    pub(crate) fn decode_raw_form(
        &self,
        id: NodeId,
        field: &str,
        text: Option<&str>,
    ) -> Result<DataValue> {
        decode_raw_form(&self.schema, self.kind_id(id), field, text)
    }

    // ------------------------------------------------------------------------
    // Derived accessors and validation
    // ------------------------------------------------------------------------

    /// Computes a derived accessor declared on the node's template.
    pub fn derive(&self, id: NodeId, accessor: &str) -> Result<DerivedValue> {
        let spec = self.kind(id);
        let compute = spec
            .accessor(accessor)
            .map(|a| a.compute)
            .ok_or_else(|| {
                TrellisError::contract(spec.name, accessor, "node kind has no such accessor")
            })?;
        compute(self, id)
    }

    /// Validates one node: required fields first, then the kind's additional checks.
    pub fn validate(&self, id: NodeId) -> Vec<Diagnostic> {
        validation::validate_node(self, id)
    }

    /// Validates every node of the subtree rooted at `root`, pre-order.
    pub fn validate_tree(&self, root: NodeId) -> Vec<Diagnostic> {
        validation::validate_tree(self, root)
    }
}

/// Fails unless a node of `child_kind` fits the slot declared by `field`.
pub(crate) fn check_accepts(
    schema: &Schema,
    kind: &str,
    field: &ResolvedField,
    child_kind: KindId,
) -> Result<()> {
    let Some(accepts) = field.accepts else {
        return Err(TrellisError::contract(kind, field.name(), "data fields do not hold children"));
    };
    if schema.accepts(accepts, child_kind) {
        return Ok(());
    }
    let expected = match accepts {
        Accepts::Kind(expected) => schema.kind(expected).name,
        Accepts::Family(family) => family.as_str(),
    };
    Err(TrellisError::contract(
        kind,
        field.name(),
        format!("expected {expected}, got {}", schema.kind(child_kind)),
    ))
}

pub(crate) fn check_data_value(
    kind: &str,
    field: &ResolvedField,
    value: Option<&DataValue>,
) -> Result<()> {
    match value {
        None if field.field.required => Err(TrellisError::contract(
            kind,
            field.name(),
            "required field cannot be absent",
        )),
        None => Ok(()),
        Some(value) => match field.field.field_type {
            crate::schema::FieldType::Data(expected) if expected == value.data_type() => {
                match field.field.bounds {
                    Some((min, max)) if !field.field.admits(value) => Err(TrellisError::contract(
                        kind,
                        field.name(),
                        format!("{value:?} is outside {min}..={max}"),
                    )),
                    _ => Ok(()),
                }
            }
            crate::schema::FieldType::Data(expected) => Err(TrellisError::contract(
                kind,
                field.name(),
                format!("expected {expected}, got {}", value.data_type()),
            )),
            crate::schema::FieldType::Child(_) => Err(TrellisError::contract(
                kind,
                field.name(),
                "child fields do not hold data",
            )),
        },
    }
}

pub(crate) fn decode_raw_form(
    schema: &Schema,
    kind: KindId,
    field: &str,
    text: Option<&str>,
) -> Result<DataValue> {
    let (_, resolved) = Tree::resolve(schema, kind, field, &[FieldCategory::SingleData])?;
    let kind_name = schema.kind(kind).name;
    let codec = resolved.field.raw_form.ok_or_else(|| {
        TrellisError::contract(kind_name, field, "field has no raw-form codec")
    })?;
    codec
        .parse(text)
        .map_err(|e| e.in_field(format!("{kind_name}.{field}")))
}
