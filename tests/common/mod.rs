//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Once;

use trellis::{NodeId, Tree};

static INIT: Once = Once::new();

/// Initialize logging for tests (call once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A standard tree with test logging enabled.
pub fn tree() -> Tree {
    init_test_logging();
    Tree::standard().expect("standard schema generates")
}

pub fn identifier(tree: &mut Tree, name: &str) -> NodeId {
    tree.build("Identifier").data("name", name).finish().unwrap()
}

/// `name` as an expression.
pub fn name_expr(tree: &mut Tree, name: &str) -> NodeId {
    let id = identifier(tree, name);
    tree.build("IdentifierExpression")
        .child("identifier", id)
        .finish()
        .unwrap()
}

pub fn empty_statement(tree: &mut Tree) -> NodeId {
    tree.build("EmptyStatement").finish().unwrap()
}

pub fn block(tree: &mut Tree, contents: &[NodeId]) -> NodeId {
    tree.build("Block")
        .children("contents", contents.iter().copied())
        .finish()
        .unwrap()
}

/// A plain type reference such as `java.util.List`, without generics.
pub fn type_ref(tree: &mut Tree, dotted: &[&str]) -> NodeId {
    let parts: Vec<NodeId> = dotted
        .iter()
        .map(|name| {
            let id = identifier(tree, name);
            tree.build("TypeReferencePart")
                .child("identifier", id)
                .finish()
                .unwrap()
        })
        .collect();
    tree.build("TypeReference")
        .children("parts", parts)
        .finish()
        .unwrap()
}
