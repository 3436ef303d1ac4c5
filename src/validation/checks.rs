//! Additional checks registered on the standard templates.

use super::DiagnosticSink;
use crate::tree::{NodeId, Tree};

/// A try statement needs at least one catch or a finally block.
pub fn check_not_lone_try(tree: &Tree, id: NodeId, sink: &mut DiagnosticSink) {
    let no_catches = tree.children(id, "catches").map_or(true, <[_]>::is_empty);
    let no_finally = matches!(tree.child(id, "finally"), Ok(None));
    if no_catches && no_finally {
        sink.report(id, "try statement with no catches and no finally");
    }
}

/// A catch clause declares exactly one exception variable.
pub fn check_catch_declares_one_variable(tree: &Tree, id: NodeId, sink: &mut DiagnosticSink) {
    let Ok(Some(declaration)) = tree.child(id, "exception_declaration") else {
        return;
    };
    let count = tree
        .children(declaration, "variables")
        .map_or(0, <[_]>::len);
    if count != 1 {
        sink.report(id, "catch declaration must declare exactly one variable");
    }
}
