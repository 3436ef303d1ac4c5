//! Structural validation of try statements and catch clauses.

mod common;

use trellis::{NodeId, Tree};

use common::{block, empty_statement, identifier, tree, type_ref};

const LONE_TRY: &str = "try statement with no catches and no finally";
const ONE_VARIABLE: &str = "catch declaration must declare exactly one variable";

fn declaration(tree: &mut Tree, names: &[&str]) -> NodeId {
    let type_reference = type_ref(tree, &["Exception"]);
    let entries: Vec<NodeId> = names
        .iter()
        .map(|name| {
            let id = identifier(tree, name);
            tree.build("VariableDeclarationEntry")
                .child("name", id)
                .finish()
                .unwrap()
        })
        .collect();
    tree.build("VariableDeclaration")
        .child("type_reference", type_reference)
        .children("variables", entries)
        .finish()
        .unwrap()
}

fn catch_clause(tree: &mut Tree, names: &[&str]) -> NodeId {
    let decl = declaration(tree, names);
    let body = block(tree, &[]);
    tree.build("Catch")
        .child("exception_declaration", decl)
        .child("body", body)
        .finish()
        .unwrap()
}

#[test]
fn lone_try_yields_exactly_one_diagnostic() {
    let mut tree = tree();
    let body = block(&mut tree, &[]);
    let stmt = tree.build("Try").child("body", body).finish().unwrap();

    let diagnostics = tree.validate(stmt);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].node, stmt);
    assert_eq!(diagnostics[0].message, LONE_TRY);
}

#[test]
fn try_with_a_catch_is_valid() {
    let mut tree = tree();
    let body = block(&mut tree, &[]);
    let catch = catch_clause(&mut tree, &["e"]);
    let stmt = tree
        .build("Try")
        .child("body", body)
        .children("catches", [catch])
        .finish()
        .unwrap();
    assert!(tree.validate(stmt).is_empty());
    assert!(tree.validate_tree(stmt).is_empty());
}

#[test]
fn try_with_only_finally_is_valid() {
    let mut tree = tree();
    let body = block(&mut tree, &[]);
    let finally = block(&mut tree, &[]);
    let stmt = tree
        .build("Try")
        .child("body", body)
        .child("finally", finally)
        .finish()
        .unwrap();
    assert!(tree.validate(stmt).is_empty());
}

#[test]
fn removing_the_last_catch_makes_try_lone_again() {
    let mut tree = tree();
    let body = block(&mut tree, &[]);
    let catch = catch_clause(&mut tree, &["e"]);
    let stmt = tree
        .build("Try")
        .child("body", body)
        .children("catches", [catch])
        .finish()
        .unwrap();
    tree.list(stmt, "catches").unwrap().remove(catch).unwrap();
    assert_eq!(tree.validate(stmt).len(), 1);
}

#[test]
fn catch_must_declare_exactly_one_variable() {
    let mut tree = tree();
    let two = catch_clause(&mut tree, &["a", "b"]);
    let diagnostics = tree.validate(two);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, ONE_VARIABLE);

    let none = catch_clause(&mut tree, &[]);
    assert_eq!(tree.validate(none).len(), 1);
}

#[test]
fn validate_tree_accumulates_in_pre_order() {
    let mut tree = tree();
    let inner_body = block(&mut tree, &[]);
    let inner = tree.build("Try").child("body", inner_body).finish().unwrap();
    let bad_catch = catch_clause(&mut tree, &["a", "b"]);
    let outer_body = block(&mut tree, &[inner]);
    let outer = tree
        .build("Try")
        .child("body", outer_body)
        .children("catches", [bad_catch])
        .finish()
        .unwrap();
    let filler = empty_statement(&mut tree);
    let root = block(&mut tree, &[outer, filler]);

    let diagnostics = tree.validate_tree(root);
    let found: Vec<(NodeId, &str)> = diagnostics
        .iter()
        .map(|d| (d.node, d.message.as_str()))
        .collect();
    assert_eq!(found, vec![(inner, LONE_TRY), (bad_catch, ONE_VARIABLE)]);
}
