//! Schema generation: validating templates and resolving them into a [`Schema`].
//!
//! # Error Handling
//!
//! Every malformed declaration is reported as a `trellis::schema` error naming the node
//! kind at fault. Generation stops at the first error; a `Schema` value therefore always
//! describes a consistent set of node kinds.
//!
//! # Rejected Declarations
//! | Problem                                   | Example                                  |
//! |-------------------------------------------|------------------------------------------|
//! | duplicate kind name                       | two `If` templates                       |
//! | kind named after a family                 | `NodeTemplate::new("Statement")`         |
//! | duplicate field / check / accessor name   | two `condition` fields                   |
//! | child of an unknown kind                  | `Field::child("x", "Nope")`              |
//! | required list field                       | `Field::children(..).required()`         |
//! | initial value on a list field             | lists always start empty                 |
//! | initial value of the wrong type           | `Int` initial on a `Bool` field          |
//! | raw-form codec on a child field           | codecs only decode data                  |
//! | raw-form codec of another data type       | unary codec on a binary operator field   |
//! | bounds on a non-`Int` field or empty      | `.bounded(3, 1)`                         |
//! | initial value outside the bounds          | `Int(-1)` on a field bounded at zero     |
//! | initial node not accepted by its field    | `NewNode("Block")` on an `Expression`    |
//! | initial nodes that recurse                | `A` starts with a new `A`                |
//!
//! # Thread Safety
//! A generated `Schema` is immutable and is shared between trees through `Arc`.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::Serialize;

use super::classify::{classify, Classification};
use super::{
    AdditionalCheck, DataType, DerivedAccessor, Family, Field, FieldType, InitialValue,
    NodeTemplate,
};
use crate::codec::RawFormCodec;
use crate::errors::{Result, TrellisError};

/// Index of a node kind inside its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct KindId(pub(crate) usize);

impl KindId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a child slot accepts, after name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accepts {
    Kind(KindId),
    Family(Family),
}

/// A field declaration together with everything generation derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedField {
    #[serde(flatten)]
    pub field: Field,
    pub classification: Classification,
    #[serde(skip)]
    pub accepts: Option<Accepts>,
    #[serde(skip)]
    pub initial_kind: Option<KindId>,
}

impl ResolvedField {
    pub fn name(&self) -> &'static str {
        self.field.name
    }
}

/// A generated node kind.
#[derive(Debug, Clone, Serialize)]
pub struct KindSpec {
    pub name: &'static str,
    pub family: Option<Family>,
    pub fields: Vec<ResolvedField>,
    pub checks: Vec<AdditionalCheck>,
    pub accessors: Vec<DerivedAccessor>,
    #[serde(skip)]
    field_index: HashMap<&'static str, usize>,
}

impl KindSpec {
    /// Slot index and resolved declaration of the named field.
    pub fn field(&self, name: &str) -> Option<(usize, &ResolvedField)> {
        self.field_index
            .get(name)
            .map(|&index| (index, &self.fields[index]))
    }

    /// Child fields in declaration order; the basis of every generic tree walk.
    pub fn child_fields(&self) -> impl Iterator<Item = (usize, &ResolvedField)> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.classification.structural)
    }

    pub fn accessor(&self, name: &str) -> Option<&DerivedAccessor> {
        self.accessors.iter().find(|a| a.name == name)
    }
}

/// An immutable, validated set of node kinds.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    kinds: Vec<KindSpec>,
    #[serde(skip)]
    by_name: HashMap<&'static str, KindId>,
}

impl Schema {
    pub fn kind_id(&self, name: &str) -> Option<KindId> {
        self.by_name.get(name).copied()
    }

    pub fn kind(&self, id: KindId) -> &KindSpec {
        &self.kinds[id.0]
    }

    pub fn kind_by_name(&self, name: &str) -> Option<&KindSpec> {
        self.kind_id(name).map(|id| self.kind(id))
    }

    pub fn kinds(&self) -> impl Iterator<Item = (KindId, &KindSpec)> {
        self.kinds.iter().enumerate().map(|(i, k)| (KindId(i), k))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Whether a node of kind `kind` may be stored in a slot accepting `accepts`.
    pub fn accepts(&self, accepts: Accepts, kind: KindId) -> bool {
        match accepts {
            Accepts::Kind(expected) => expected == kind,
            Accepts::Family(family) => self.kind(kind).family == Some(family),
        }
    }

    /// Every raw-form codec binding as `(kind, field, codec)`.
    pub fn codecs(&self) -> Vec<(&'static str, &'static str, RawFormCodec)> {
        self.kinds
            .iter()
            .flat_map(|kind| {
                kind.fields.iter().filter_map(move |f| {
                    f.field.raw_form.map(|codec| (kind.name, f.field.name, codec))
                })
            })
            .collect()
    }
}

/// Collects node templates and generates a [`Schema`] from them.
#[derive(Debug, Default, Clone)]
pub struct SchemaBuilder {
    templates: Vec<NodeTemplate>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template(mut self, template: NodeTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn templates(mut self, templates: impl IntoIterator<Item = NodeTemplate>) -> Self {
        self.templates.extend(templates);
        self
    }

    /// Validates every declaration and resolves child type names.
    ///
    /// # Errors
    /// Returns a `trellis::schema` error for the first malformed declaration; see the
    /// module docs for the full list.
    pub fn generate(self) -> Result<Schema> {
        let by_name = index_kinds(&self.templates)?;

        let kinds = self
            .templates
            .into_iter()
            .map(|template| resolve_template(template, &by_name))
            .collect::<Result<Vec<_>>>()?;

        let schema = Schema { kinds, by_name };
        check_initial_kinds(&schema)?;

        debug!(
            "generated schema with {} node kinds and {} raw-form bindings",
            schema.len(),
            schema.codecs().len()
        );
        Ok(schema)
    }
}

// ============================================================================
// Internal Helpers
// ============================================================================

fn index_kinds(templates: &[NodeTemplate]) -> Result<HashMap<&'static str, KindId>> {
    let mut by_name = HashMap::with_capacity(templates.len());
    for (index, template) in templates.iter().enumerate() {
        if Family::from_name(template.name).is_some() {
            return Err(TrellisError::schema(
                template.name,
                "node kind name collides with a root family name",
            ));
        }
        if by_name.insert(template.name, KindId(index)).is_some() {
            return Err(TrellisError::schema(template.name, "node kind declared twice"));
        }
    }
    Ok(by_name)
}

fn resolve_template(
    template: NodeTemplate,
    by_name: &HashMap<&'static str, KindId>,
) -> Result<KindSpec> {
    let kind = template.name;
    reject_duplicates(kind, "field", template.fields.iter().map(|f| f.name))?;
    reject_duplicates(kind, "check", template.checks.iter().map(|c| c.name))?;
    reject_duplicates(kind, "accessor", template.accessors.iter().map(|a| a.name))?;

    let mut field_index = HashMap::with_capacity(template.fields.len());
    let mut fields = Vec::with_capacity(template.fields.len());
    for (index, field) in template.fields.into_iter().enumerate() {
        field_index.insert(field.name, index);
        fields.push(resolve_field(kind, field, by_name)?);
    }

    Ok(KindSpec {
        name: kind,
        family: template.family,
        fields,
        checks: template.checks,
        accessors: template.accessors,
        field_index,
    })
}

fn resolve_field(
    kind: &'static str,
    field: Field,
    by_name: &HashMap<&'static str, KindId>,
) -> Result<ResolvedField> {
    let fail = |message: String| TrellisError::schema(kind, message);

    if field.required && field.is_list() {
        return Err(fail(format!(
            "list field `{}` cannot be required; an empty list is its absent state",
            field.name
        )));
    }
    if field.is_list() && field.initial.is_some() {
        return Err(fail(format!(
            "list field `{}` cannot declare an initial value",
            field.name
        )));
    }

    let accepts = match field.field_type {
        FieldType::Child(type_name) => Some(resolve_child_type(type_name, by_name).ok_or_else(
            || {
                fail(format!(
                    "field `{}` refers to unknown node kind `{}`",
                    field.name, type_name
                ))
            },
        )?),
        FieldType::Data(_) => None,
    };

    if let Some(codec) = field.raw_form {
        match field.field_type {
            FieldType::Child(_) => {
                return Err(fail(format!(
                    "child field `{}` cannot bind raw-form codec `{}`",
                    field.name, codec.name
                )));
            }
            FieldType::Data(data_type) if data_type != codec.data_type => {
                return Err(fail(format!(
                    "raw-form codec `{}` decodes {} but field `{}` holds {}",
                    codec.name, codec.data_type, field.name, data_type
                )));
            }
            FieldType::Data(_) => {}
        }
    }

    if let Some((min, max)) = field.bounds {
        if field.field_type != FieldType::Data(DataType::Int) {
            return Err(fail(format!(
                "field `{}` declares bounds but does not hold int",
                field.name
            )));
        }
        if min > max {
            return Err(fail(format!(
                "field `{}` declares the empty range {min}..={max}",
                field.name
            )));
        }
    }

    let initial_kind = match (&field.initial, field.field_type) {
        (None, _) => None,
        (Some(InitialValue::Data(value)), FieldType::Data(data_type)) => {
            if value.data_type() != data_type {
                return Err(fail(format!(
                    "initial value of field `{}` is {} but the field holds {}",
                    field.name,
                    value.data_type(),
                    data_type
                )));
            }
            if !field.admits(value) {
                return Err(fail(format!(
                    "initial value of field `{}` is outside its bounds",
                    field.name
                )));
            }
            None
        }
        (Some(InitialValue::NewNode(initial)), FieldType::Child(_)) => {
            let id = by_name.get(initial).copied().ok_or_else(|| {
                fail(format!(
                    "initial value of field `{}` creates unknown node kind `{}`",
                    field.name, initial
                ))
            })?;
            Some(id)
        }
        (Some(InitialValue::Data(_)), FieldType::Child(_)) => {
            return Err(fail(format!(
                "child field `{}` cannot start with a data value",
                field.name
            )));
        }
        (Some(InitialValue::NewNode(_)), FieldType::Data(_)) => {
            return Err(fail(format!(
                "data field `{}` cannot start with a node",
                field.name
            )));
        }
    };

    let classification = classify(&field);
    Ok(ResolvedField {
        field,
        classification,
        accepts,
        initial_kind,
    })
}

fn resolve_child_type(name: &str, by_name: &HashMap<&'static str, KindId>) -> Option<Accepts> {
    Family::from_name(name)
        .map(Accepts::Family)
        .or_else(|| by_name.get(name).copied().map(Accepts::Kind))
}

fn reject_duplicates(
    kind: &'static str,
    what: &str,
    names: impl Iterator<Item = &'static str>,
) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(TrellisError::schema(
                kind,
                format!("{what} `{name}` declared twice"),
            ));
        }
    }
    Ok(())
}

/// A `NewNode` initial value must produce a node its own slot accepts.
fn check_initial_kinds(schema: &Schema) -> Result<()> {
    for kind in &schema.kinds {
        for field in &kind.fields {
            let (Some(accepts), Some(initial)) = (field.accepts, field.initial_kind) else {
                continue;
            };
            if !schema.accepts(accepts, initial) {
                return Err(TrellisError::schema(
                    kind.name,
                    format!(
                        "initial node `{}` is not accepted by field `{}`",
                        schema.kind(initial).name,
                        field.name()
                    ),
                ));
            }
        }
    }
    for (start, kind) in schema.kinds() {
        let mut seen = vec![start];
        let mut frontier: Vec<KindId> = initial_kinds(kind).collect();
        while let Some(next) = frontier.pop() {
            if next == start {
                return Err(TrellisError::schema(
                    kind.name,
                    "initial values create nodes of this kind recursively",
                ));
            }
            if !seen.contains(&next) {
                seen.push(next);
                frontier.extend(initial_kinds(schema.kind(next)));
            }
        }
    }
    Ok(())
}

fn initial_kinds(kind: &KindSpec) -> impl Iterator<Item = KindId> + '_ {
    kind.fields.iter().filter_map(|f| f.initial_kind)
}

impl fmt::Display for KindSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            Some(family) => write!(f, "{} : {}", self.name, family),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BINARY_OPERATOR, UNARY_OPERATOR};
    use crate::errors::ErrorType;
    use crate::schema::{DataType, DataValue};

    fn leaf() -> NodeTemplate {
        NodeTemplate::new("Leaf").extending(Family::Expression)
    }

    fn schema_error(builder: SchemaBuilder) -> String {
        let err = builder.generate().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Schema);
        err.to_string()
    }

    #[test]
    fn test_unknown_child_kind_is_rejected() {
        let msg = schema_error(
            SchemaBuilder::new().template(NodeTemplate::new("Holder").field(Field::child("x", "Nope").required())),
        );
        assert!(msg.contains("unknown node kind `Nope`"), "{msg}");
    }

    #[test]
    fn test_duplicate_kind_and_field_are_rejected() {
        let msg = schema_error(SchemaBuilder::new().template(leaf()).template(leaf()));
        assert!(msg.contains("declared twice"));

        let msg = schema_error(SchemaBuilder::new().template(
            NodeTemplate::new("Pair")
                .field(Field::child("a", "Expression"))
                .field(Field::child("a", "Expression")),
        ));
        assert!(msg.contains("field `a` declared twice"));
    }

    #[test]
    fn test_family_names_are_reserved() {
        let msg = schema_error(SchemaBuilder::new().template(NodeTemplate::new("Statement")));
        assert!(msg.contains("root family"));
    }

    #[test]
    fn test_required_list_is_rejected() {
        let msg = schema_error(
            SchemaBuilder::new().template(NodeTemplate::new("Seq").field(Field::children("items", "Expression").required())),
        );
        assert!(msg.contains("cannot be required"));
    }

    #[test]
    fn test_codec_bindings_are_type_checked() {
        let msg = schema_error(SchemaBuilder::new().template(leaf()).template(
            NodeTemplate::new("Op").field(Field::child("operand", "Leaf").raw_form(BINARY_OPERATOR)),
        ));
        assert!(msg.contains("cannot bind raw-form codec"));

        let msg = schema_error(SchemaBuilder::new().template(
            NodeTemplate::new("Op").field(Field::data("operator", DataType::BinaryOperator).raw_form(UNARY_OPERATOR)),
        ));
        assert!(msg.contains("decodes unary operator"));
    }

    #[test]
    fn test_initial_values_are_type_checked() {
        let msg = schema_error(SchemaBuilder::new().template(
            NodeTemplate::new("Flag").field(Field::data("on", DataType::Bool).initial(InitialValue::Data(DataValue::Int(1)))),
        ));
        assert!(msg.contains("initial value of field `on` is int"));

        let msg = schema_error(
            SchemaBuilder::new()
                .template(NodeTemplate::new("Other"))
                .template(leaf())
                .template(NodeTemplate::new("Holder").field(Field::child("x", "Leaf").initial(InitialValue::NewNode("Other")))),
        );
        assert!(msg.contains("not accepted by field `x`"));
    }

    #[test]
    fn test_bounds_are_checked() {
        let msg = schema_error(SchemaBuilder::new().template(
            NodeTemplate::new("Flag").field(Field::data("on", DataType::Bool).bounded(0, 1)),
        ));
        assert!(msg.contains("does not hold int"));

        let msg = schema_error(SchemaBuilder::new().template(
            NodeTemplate::new("Dims").field(Field::data("n", DataType::Int).bounded(3, 1)),
        ));
        assert!(msg.contains("empty range"));

        let msg = schema_error(SchemaBuilder::new().template(
            NodeTemplate::new("Dims").field(
                Field::data("n", DataType::Int)
                    .bounded(0, 9)
                    .initial(InitialValue::Data(DataValue::Int(-1))),
            ),
        ));
        assert!(msg.contains("outside its bounds"));
    }

    #[test]
    fn test_recursive_initial_nodes_are_rejected() {
        let msg = schema_error(
            SchemaBuilder::new()
                .template(NodeTemplate::new("Ping").field(
                    Field::child("next", "Pong").required().initial(InitialValue::NewNode("Pong")),
                ))
                .template(NodeTemplate::new("Pong").field(
                    Field::child("next", "Ping").required().initial(InitialValue::NewNode("Ping")),
                )),
        );
        assert!(msg.contains("recursively"), "{msg}");
    }

    #[test]
    fn test_resolution_links_fields_to_kinds() {
        let schema = SchemaBuilder::new()
            .template(leaf())
            .template(
                NodeTemplate::new("Holder")
                    .field(Field::child("one", "Leaf"))
                    .field(Field::children("many", "Expression"))
                    .field(Field::data("flag", DataType::Bool)),
            )
            .generate()
            .unwrap();
        let leaf_id = schema.kind_id("Leaf").unwrap();
        let holder = schema.kind_by_name("Holder").unwrap();

        let (index, one) = holder.field("one").unwrap();
        assert_eq!(index, 0);
        assert_eq!(one.accepts, Some(Accepts::Kind(leaf_id)));
        assert_eq!(holder.child_fields().count(), 2);
        assert!(schema.accepts(Accepts::Family(Family::Expression), leaf_id));
        assert!(!schema.accepts(Accepts::Family(Family::Statement), leaf_id));
    }
}
