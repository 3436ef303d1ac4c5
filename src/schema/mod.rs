//! # Node Schema Declarations
//!
//! A [`NodeTemplate`] declares one node kind: its root family, its ordered fields, the
//! additional checks run by [`crate::validation`] and the derived accessors computed by
//! [`crate::derived`]. Templates are plain data. [`SchemaBuilder::generate`] validates and
//! resolves a set of them into an immutable [`Schema`], which the [`crate::tree::Tree`]
//! runtime interprets.
//!
//! ## Field taxonomy
//!
//! | Constructor        | Category     | Traversed | Nullable               |
//! |--------------------|--------------|-----------|------------------------|
//! | `Field::child`     | single child | yes       | unless `required()`    |
//! | `Field::children`  | list child   | yes       | never (empty list)     |
//! | `Field::data`      | single data  | no        | unless `required()`    |
//! | `Field::data_list` | list data    | no        | never (empty list)     |
//!
//! ## Example
//! ```rust
//! use trellis::schema::{Family, Field, NodeTemplate, SchemaBuilder};
//! let schema = SchemaBuilder::new()
//!     .template(NodeTemplate::new("Name").field(Field::data("text", trellis::schema::DataType::Str).required()))
//!     .template(
//!         NodeTemplate::new("Goto")
//!             .extending(Family::Statement)
//!             .field(Field::child("label", "Name").required()),
//!     )
//!     .generate()
//!     .unwrap();
//! assert_eq!(schema.len(), 2);
//! ```

use std::fmt;

use serde::{Serialize, Serializer};

use crate::codec::RawFormCodec;
use crate::derived::DerivedValue;
use crate::errors::Result;
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::tree::{NodeId, Tree};
use crate::validation::DiagnosticSink;

pub mod classify;
pub mod registry;
pub mod standard;

pub use classify::{classify, AccessorShape, Classification, FieldCategory};
pub use registry::{Accepts, KindId, KindSpec, ResolvedField, Schema, SchemaBuilder};

// ============================================================================
// ROOT FAMILIES
// ============================================================================

/// The two mutually exclusive capability families a node kind may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Family {
    Statement,
    Expression,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Statement => "Statement",
            Family::Expression => "Expression",
        }
    }

    /// Resolves a declared child type name that refers to a family rather than a kind.
    pub fn from_name(name: &str) -> Option<Family> {
        match name {
            "Statement" => Some(Family::Statement),
            "Expression" => Some(Family::Expression),
            _ => None,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DATA VALUES
// ============================================================================

/// Wildcard marker of a generic type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum WildcardKind {
    #[default]
    None,
    Unbound,
    Extends,
    Super,
}

/// Closed set of scalar types a data field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    Bool,
    Int,
    Str,
    BinaryOperator,
    UnaryOperator,
    Wildcard,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::Str => "string",
            DataType::BinaryOperator => "binary operator",
            DataType::UnaryOperator => "unary operator",
            DataType::Wildcard => "wildcard",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum DataValue {
    Bool(bool),
    Int(i64),
    Str(String),
    BinaryOperator(BinaryOperator),
    UnaryOperator(UnaryOperator),
    Wildcard(WildcardKind),
}

impl DataValue {
    pub fn data_type(&self) -> DataType {
        match self {
            DataValue::Bool(_) => DataType::Bool,
            DataValue::Int(_) => DataType::Int,
            DataValue::Str(_) => DataType::Str,
            DataValue::BinaryOperator(_) => DataType::BinaryOperator,
            DataValue::UnaryOperator(_) => DataType::UnaryOperator,
            DataValue::Wildcard(_) => DataType::Wildcard,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            DataValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            DataValue::BinaryOperator(op) => Some(*op),
            _ => None,
        }
    }

    pub fn as_unary_operator(&self) -> Option<UnaryOperator> {
        match self {
            DataValue::UnaryOperator(op) => Some(*op),
            _ => None,
        }
    }

    pub fn as_wildcard(&self) -> Option<WildcardKind> {
        match self {
            DataValue::Wildcard(w) => Some(*w),
            _ => None,
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Str(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Str(value)
    }
}

impl From<BinaryOperator> for DataValue {
    fn from(value: BinaryOperator) -> Self {
        DataValue::BinaryOperator(value)
    }
}

impl From<UnaryOperator> for DataValue {
    fn from(value: UnaryOperator) -> Self {
        DataValue::UnaryOperator(value)
    }
}

impl From<WildcardKind> for DataValue {
    fn from(value: WildcardKind) -> Self {
        DataValue::Wildcard(value)
    }
}

// ============================================================================
// FIELDS
// ============================================================================

/// Declared type of a field: a child (kind or family name) or a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    /// Names another node kind, or `Statement` / `Expression` for any kind of that family.
    Child(&'static str),
    Data(DataType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Multiplicity {
    Single,
    List,
}

/// Value a field holds before explicit assignment. Evaluated once per node instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InitialValue {
    Data(DataValue),
    /// Allocates a fresh node of the named kind for every new instance.
    NewNode(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub field_type: FieldType,
    pub multiplicity: Multiplicity,
    pub required: bool,
    pub initial: Option<InitialValue>,
    pub raw_form: Option<RawFormCodec>,
    /// Inclusive range an `Int` field accepts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<(i64, i64)>,
}

impl Field {
    fn new(name: &'static str, field_type: FieldType, multiplicity: Multiplicity) -> Self {
        Self {
            name,
            field_type,
            multiplicity,
            required: false,
            initial: None,
            raw_form: None,
            bounds: None,
        }
    }

    pub fn child(name: &'static str, kind: &'static str) -> Self {
        Self::new(name, FieldType::Child(kind), Multiplicity::Single)
    }

    pub fn children(name: &'static str, kind: &'static str) -> Self {
        Self::new(name, FieldType::Child(kind), Multiplicity::List)
    }

    pub fn data(name: &'static str, data_type: DataType) -> Self {
        Self::new(name, FieldType::Data(data_type), Multiplicity::Single)
    }

    pub fn data_list(name: &'static str, data_type: DataType) -> Self {
        Self::new(name, FieldType::Data(data_type), Multiplicity::List)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn initial(mut self, value: InitialValue) -> Self {
        self.initial = Some(value);
        self
    }

    pub fn raw_form(mut self, codec: RawFormCodec) -> Self {
        self.raw_form = Some(codec);
        self
    }

    pub fn bounded(mut self, min: i64, max: i64) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Whether `value` lies within the declared bounds. Unbounded fields and
    /// non-integer values always do.
    pub fn admits(&self, value: &DataValue) -> bool {
        match (self.bounds, value.as_int()) {
            (Some((min, max)), Some(v)) => (min..=max).contains(&v),
            _ => true,
        }
    }

    pub fn is_child(&self) -> bool {
        matches!(self.field_type, FieldType::Child(_))
    }

    pub fn is_list(&self) -> bool {
        self.multiplicity == Multiplicity::List
    }
}

// ============================================================================
// HOOKS
// ============================================================================

/// Additional structural check. Receives the tree immutably, so it cannot mutate nodes.
pub type CheckFn = fn(&Tree, NodeId, &mut DiagnosticSink);

/// Derived accessor. Recomputed on every call; nothing is cached on the node.
pub type DerivedFn = fn(&Tree, NodeId) -> Result<DerivedValue>;

#[derive(Clone, Copy)]
pub struct AdditionalCheck {
    pub name: &'static str,
    pub run: CheckFn,
}

#[derive(Clone, Copy)]
pub struct DerivedAccessor {
    pub name: &'static str,
    pub compute: DerivedFn,
}

impl fmt::Debug for AdditionalCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdditionalCheck({})", self.name)
    }
}

impl fmt::Debug for DerivedAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedAccessor({})", self.name)
    }
}

impl Serialize for AdditionalCheck {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

impl Serialize for DerivedAccessor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// Declaration of one node kind. Authored once, consumed once by generation.
#[derive(Debug, Clone, Serialize)]
pub struct NodeTemplate {
    pub name: &'static str,
    pub family: Option<Family>,
    pub fields: Vec<Field>,
    pub checks: Vec<AdditionalCheck>,
    pub accessors: Vec<DerivedAccessor>,
}

impl NodeTemplate {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            family: None,
            fields: Vec::new(),
            checks: Vec::new(),
            accessors: Vec::new(),
        }
    }

    pub fn extending(mut self, family: Family) -> Self {
        self.family = Some(family);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn check(mut self, name: &'static str, run: CheckFn) -> Self {
        self.checks.push(AdditionalCheck { name, run });
        self
    }

    pub fn accessor(mut self, name: &'static str, compute: DerivedFn) -> Self {
        self.accessors.push(DerivedAccessor { name, compute });
        self
    }
}
