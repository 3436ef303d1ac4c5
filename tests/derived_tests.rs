//! Derived accessors on type references.

mod common;

use trellis::derived::{self, DerivedValue};
use trellis::nodes::{TypeReference, TypedNode};
use trellis::schema::{DataValue, WildcardKind};
use trellis::ErrorType;

use common::{tree, type_ref};

#[test]
fn type_name_joins_parts_generics_and_dimensions() {
    let mut tree = tree();
    let list = type_ref(&mut tree, &["java", "util", "List"]);
    let string = type_ref(&mut tree, &["String"]);

    let owner = tree.generics(list).unwrap().add_to_end(string).unwrap().owner();
    assert_eq!(owner, list);
    tree.set_data(list, "array_dimensions", Some(DataValue::Int(2)))
        .unwrap();

    assert_eq!(derived::type_name(&tree, list).unwrap(), "java.util.List<String>[][]");
    assert_eq!(
        tree.derive(list, "type_name").unwrap(),
        DerivedValue::Text("java.util.List<String>[][]".to_string())
    );
}

#[test]
fn wildcards_render_with_their_bounds() {
    let mut tree = tree();
    let map = type_ref(&mut tree, &["Map"]);
    let number = type_ref(&mut tree, &["Number"]);
    let integer = type_ref(&mut tree, &["Integer"]);
    let unbound = tree.build("TypeReference").finish().unwrap();
    tree.set_data(number, "wildcard", Some(WildcardKind::Extends.into()))
        .unwrap();
    tree.set_data(integer, "wildcard", Some(WildcardKind::Super.into()))
        .unwrap();
    tree.set_data(unbound, "wildcard", Some(WildcardKind::Unbound.into()))
        .unwrap();

    tree.generics(map)
        .unwrap()
        .add_to_end(number)
        .unwrap()
        .add_to_end(integer)
        .unwrap()
        .add_to_end(unbound)
        .unwrap();

    assert_eq!(
        derived::type_name(&tree, map).unwrap(),
        "Map<? extends Number, ? super Integer, ?>"
    );
}

#[test]
fn nested_generics_render_recursively() {
    let mut tree = tree();
    let outer = type_ref(&mut tree, &["List"]);
    let inner = type_ref(&mut tree, &["Set"]);
    let leaf = type_ref(&mut tree, &["String"]);
    tree.generics(inner).unwrap().add_to_end(leaf).unwrap();
    tree.generics(outer).unwrap().add_to_end(inner).unwrap();
    assert_eq!(derived::type_name(&tree, outer).unwrap(), "List<Set<String>>");
}

#[test]
fn has_generics_reports_a_non_empty_generics_list() {
    let mut tree = tree();
    let reference = type_ref(&mut tree, &["List"]);
    let handle = TypeReference::cast(&tree, reference).unwrap();
    assert!(!handle.has_generics(&tree).unwrap());

    let arg = type_ref(&mut tree, &["String"]);
    handle.generics_mut(&mut tree).unwrap().add_to_end(arg).unwrap();
    assert!(handle.has_generics(&tree).unwrap());
    assert_eq!(tree.derive(reference, "has_generics").unwrap(), DerivedValue::Bool(true));
}

#[test]
fn generics_view_targets_the_last_part() {
    let mut tree = tree();
    let reference = type_ref(&mut tree, &["Outer", "Inner"]);
    let parts = tree.children(reference, "parts").unwrap().to_vec();
    let last = parts[1];

    let binding = tree.derive(reference, "generics").unwrap().as_list().unwrap();
    assert_eq!(binding.owner, reference);
    assert_eq!(tree.parent(binding.target), Some(last));

    let arg = type_ref(&mut tree, &["T"]);
    tree.list_binding(binding).unwrap().add_to_end(arg).unwrap();
    assert_eq!(tree.parent(arg), Some(binding.target));
    assert_eq!(derived::part_type_name(&tree, last).unwrap(), "Inner<T>");
    assert_eq!(derived::part_type_name(&tree, parts[0]).unwrap(), "Outer");
    assert_eq!(derived::type_name(&tree, reference).unwrap(), "Outer.Inner<T>");
}

#[test]
fn reference_without_parts_has_no_generics_list() {
    let mut tree = tree();
    let empty = tree.build("TypeReference").finish().unwrap();
    let err = tree.derive(empty, "generics").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Contract);
    assert_eq!(tree.derive(empty, "has_generics").unwrap(), DerivedValue::Bool(false));
}

#[test]
fn every_part_gets_its_own_type_arguments() {
    let mut tree = tree();
    let reference = type_ref(&mut tree, &["a", "b"]);
    let parts = tree.children(reference, "parts").unwrap().to_vec();
    let first = tree.child(parts[0], "type_arguments").unwrap();
    let second = tree.child(parts[1], "type_arguments").unwrap();
    assert!(first.is_some());
    assert_ne!(first, second);
}

#[test]
fn deep_copy_recomputes_derived_values() {
    let mut tree = tree();
    let list = type_ref(&mut tree, &["List"]);
    let arg = type_ref(&mut tree, &["String"]);
    tree.generics(list).unwrap().add_to_end(arg).unwrap();

    let copy = tree.deep_copy(list);
    assert!(tree.structurally_equal(list, copy));
    assert_eq!(derived::type_name(&tree, copy).unwrap(), "List<String>");

    tree.generics(copy).unwrap().clear();
    assert_eq!(derived::type_name(&tree, copy).unwrap(), "List");
    assert_eq!(derived::type_name(&tree, list).unwrap(), "List<String>");
}

#[test]
fn array_dimensions_are_bounded() {
    let mut tree = tree();
    let string = type_ref(&mut tree, &["String"]);

    let err = tree
        .set_data(string, "array_dimensions", Some(DataValue::Int(-1)))
        .unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Contract);
    assert!(err.to_string().contains("TypeReference.array_dimensions"));
    assert!(tree
        .set_data(string, "array_dimensions", Some(DataValue::Int(i64::MAX)))
        .is_err());
    assert_eq!(derived::type_name(&tree, string).unwrap(), "String");

    tree.set_data(string, "array_dimensions", Some(DataValue::Int(255)))
        .unwrap();
    assert_eq!(derived::type_name(&tree, string).unwrap().matches("[]").count(), 255);

    let err = tree
        .build("TypeReference")
        .data("array_dimensions", -3i64)
        .finish()
        .unwrap_err();
    assert!(err.to_string().contains("outside 0..=255"));
}
