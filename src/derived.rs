//! # Derived Accessors
//!
//! Computed operations attached to node kinds: rendered type names and the generics view
//! of type references. They are pure functions over `&Tree`, recomputed on every call,
//! and registered on the standard templates by name so that [`Tree::derive`] can reach
//! them generically.
//!
//! | Kind                | Accessor       | Result                                   |
//! |---------------------|----------------|------------------------------------------|
//! | `TypeReference`     | `type_name`    | parts joined by `.`, then `[]` per dim   |
//! | `TypeReference`     | `has_generics` | last part has type arguments             |
//! | `TypeReference`     | `generics`     | last part's argument list, owned by self |
//! | `TypeReferencePart` | `type_name`    | identifier plus rendered `<...>`         |
//! | `TypeReferencePart` | `generics`     | own argument list                        |

use serde::Serialize;

use crate::errors::{Result, TrellisError};
use crate::schema::WildcardKind;
use crate::tree::{ListAccessor, ListBinding, NodeId, Tree};

const TYPE_REFERENCE: &str = "TypeReference";
const TYPE_REFERENCE_PART: &str = "TypeReferencePart";

/// Result of a derived accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DerivedValue {
    Text(String),
    Bool(bool),
    /// A list view; open it with [`Tree::list_binding`].
    List(ListBinding),
}

impl DerivedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DerivedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DerivedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<ListBinding> {
        match self {
            DerivedValue::List(binding) => Some(*binding),
            _ => None,
        }
    }
}

fn expect_kind(tree: &Tree, id: NodeId, kind: &str, accessor: &str) -> Result<()> {
    if tree.kind_name(id) == kind {
        Ok(())
    } else {
        Err(TrellisError::contract(
            tree.kind_name(id),
            accessor,
            format!("accessor is only defined on {kind}"),
        ))
    }
}

// ============================================================================
// TYPE REFERENCES
// ============================================================================

/// Renders a type reference, e.g. `java.util.List<String>[][]`.
///
/// # Examples
///
/// ```rust
/// use trellis::{derived, Tree};
/// let mut tree = Tree::standard().unwrap();
/// let name = tree.build("Identifier").data("name", "String").finish().unwrap();
/// let part = tree.build("TypeReferencePart").child("identifier", name).finish().unwrap();
/// let string = tree
///     .build("TypeReference")
///     .children("parts", [part])
///     .data("array_dimensions", 2i64)
///     .finish()
///     .unwrap();
/// assert_eq!(derived::type_name(&tree, string).unwrap(), "String[][]");
/// ```
pub fn type_name(tree: &Tree, type_ref: NodeId) -> Result<String> {
    expect_kind(tree, type_ref, TYPE_REFERENCE, "type_name")?;
    let mut out = String::new();
    for &part in tree.children(type_ref, "parts")? {
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(&part_type_name(tree, part)?);
    }
    let dims = tree
        .data(type_ref, "array_dimensions")?
        .and_then(|v| v.as_int())
        .unwrap_or(0);
    for _ in 0..dims {
        out.push_str("[]");
    }
    Ok(out)
}

/// Whether the last part carries type arguments. `false` for a reference with no parts.
pub fn has_generics(tree: &Tree, type_ref: NodeId) -> Result<bool> {
    expect_kind(tree, type_ref, TYPE_REFERENCE, "has_generics")?;
    if tree.children(type_ref, "parts")?.is_empty() {
        return Ok(false);
    }
    let binding = generics(tree, type_ref)?;
    Ok(!tree.children(binding.target, binding.field)?.is_empty())
}

/// The last part's argument list, reported as belonging to `type_ref`.
///
/// # Errors
/// `ContractViolation` when the reference has no parts.
pub fn generics(tree: &Tree, type_ref: NodeId) -> Result<ListBinding> {
    expect_kind(tree, type_ref, TYPE_REFERENCE, "generics")?;
    let last = tree
        .children(type_ref, "parts")?
        .last()
        .copied()
        .ok_or_else(|| {
            TrellisError::contract(TYPE_REFERENCE, "generics", "type reference has no parts")
        })?;
    let part = part_generics(tree, last)?;
    Ok(ListBinding::new(type_ref, part.target, part.field))
}

// ============================================================================
// TYPE REFERENCE PARTS
// ============================================================================

/// Renders one part: its identifier, then `<...>` when it has type arguments.
pub fn part_type_name(tree: &Tree, part: NodeId) -> Result<String> {
    expect_kind(tree, part, TYPE_REFERENCE_PART, "type_name")?;
    let identifier = tree.child(part, "identifier")?.ok_or_else(|| {
        TrellisError::contract(TYPE_REFERENCE_PART, "identifier", "required field is absent")
    })?;
    let mut out = tree
        .data(identifier, "name")?
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let binding = part_generics(tree, part)?;
    let args = tree.children(binding.target, binding.field)?;
    if args.is_empty() {
        return Ok(out);
    }

    out.push('<');
    for (i, &arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let wildcard = tree
            .data(arg, "wildcard")?
            .and_then(|v| v.as_wildcard())
            .unwrap_or_default();
        match wildcard {
            WildcardKind::Extends => {
                out.push_str("? extends ");
                out.push_str(&type_name(tree, arg)?);
            }
            WildcardKind::Super => {
                out.push_str("? super ");
                out.push_str(&type_name(tree, arg)?);
            }
            WildcardKind::Unbound => out.push('?'),
            WildcardKind::None => out.push_str(&type_name(tree, arg)?),
        }
    }
    out.push('>');
    Ok(out)
}

/// The part's own argument list.
pub fn part_generics(tree: &Tree, part: NodeId) -> Result<ListBinding> {
    expect_kind(tree, part, TYPE_REFERENCE_PART, "generics")?;
    let args = tree.child(part, "type_arguments")?.ok_or_else(|| {
        TrellisError::contract(TYPE_REFERENCE_PART, "type_arguments", "required field is absent")
    })?;
    Ok(ListBinding::new(part, args, "generics"))
}

impl Tree {
    /// Opens the generics list of a type reference or of one of its parts.
    pub fn generics(&mut self, id: NodeId) -> Result<ListAccessor<'_>> {
        let binding = if self.kind_name(id) == TYPE_REFERENCE_PART {
            part_generics(self, id)?
        } else {
            generics(self, id)?
        };
        self.list_binding(binding)
    }
}

// ============================================================================
// REGISTRATION
// ============================================================================

pub(crate) fn derive_type_name(tree: &Tree, id: NodeId) -> Result<DerivedValue> {
    type_name(tree, id).map(DerivedValue::Text)
}

pub(crate) fn derive_has_generics(tree: &Tree, id: NodeId) -> Result<DerivedValue> {
    has_generics(tree, id).map(DerivedValue::Bool)
}

pub(crate) fn derive_generics(tree: &Tree, id: NodeId) -> Result<DerivedValue> {
    generics(tree, id).map(DerivedValue::List)
}

pub(crate) fn derive_part_type_name(tree: &Tree, id: NodeId) -> Result<DerivedValue> {
    part_type_name(tree, id).map(DerivedValue::Text)
}

pub(crate) fn derive_part_generics(tree: &Tree, id: NodeId) -> Result<DerivedValue> {
    part_generics(tree, id).map(DerivedValue::List)
}

#[cfg(test)]
mod derived_tests {
    use super::*;

    fn part(tree: &mut Tree, name: &str) -> NodeId {
        let id = tree.build("Identifier").data("name", name).finish().unwrap();
        tree.build("TypeReferencePart")
            .child("identifier", id)
            .finish()
            .unwrap()
    }

    #[test]
    fn test_reference_without_parts_has_no_generics() {
        let mut tree = Tree::standard().unwrap();
        let empty = tree.build("TypeReference").finish().unwrap();
        assert!(!has_generics(&tree, empty).unwrap());
        assert!(generics(&tree, empty).is_err());
        assert_eq!(type_name(&tree, empty).unwrap(), "");
    }

    #[test]
    fn test_generics_binding_is_owned_by_outer_reference() {
        let mut tree = Tree::standard().unwrap();
        let list = part(&mut tree, "List");
        let reference = tree
            .build("TypeReference")
            .children("parts", [list])
            .finish()
            .unwrap();
        let binding = generics(&tree, reference).unwrap();
        assert_eq!(binding.owner, reference);
        assert_eq!(tree.kind_name(binding.target), "TypeArguments");
        assert_eq!(tree.parent(binding.target), Some(list));
    }

    #[test]
    fn test_accessors_reject_other_kinds() {
        let mut tree = Tree::standard().unwrap();
        let stmt = tree.build("EmptyStatement").finish().unwrap();
        assert!(type_name(&tree, stmt).is_err());
        assert!(tree.derive(stmt, "type_name").is_err());
    }
}
