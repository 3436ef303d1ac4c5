//! # Structural Validation
//!
//! Validation never fails; it collects [`Diagnostic`] records. For each node the
//! required-field checks run first, and only when every required single field is present
//! do the kind's additional checks run, in declaration order. Checks receive `&Tree`, so
//! they cannot mutate the nodes they inspect.
//!
//! ## Example
//! ```rust
//! use trellis::Tree;
//! let mut tree = Tree::standard().unwrap();
//! let body = tree.build("Block").finish().unwrap();
//! let lone = tree.build("Try").child("body", body).finish().unwrap();
//! let problems = tree.validate(lone);
//! assert_eq!(problems.len(), 1);
//! assert_eq!(problems[0].message, "try statement with no catches and no finally");
//! ```

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::tree::{NodeId, Tree};

pub mod checks;

/// One structural problem found on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub node: NodeId,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.node, self.message)
    }
}

/// Accumulates diagnostics across one validation pass.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, node: NodeId, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            node,
            message: message.into(),
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Reports every absent required single field. Returns whether all were present.
fn check_required(tree: &Tree, id: NodeId, sink: &mut DiagnosticSink) -> bool {
    let spec = tree.kind(id);
    let before = sink.len();
    for field in spec.fields.iter().filter(|f| f.field.required && !f.field.is_list()) {
        let present = if field.field.is_child() {
            matches!(tree.child(id, field.name()), Ok(Some(_)))
        } else {
            matches!(tree.data(id, field.name()), Ok(Some(_)))
        };
        if !present {
            sink.report(id, format!("missing required field `{}`", field.name()));
        }
    }
    sink.len() == before
}

fn validate_into(tree: &Tree, id: NodeId, sink: &mut DiagnosticSink) {
    if !check_required(tree, id, sink) {
        return;
    }
    for check in &tree.kind(id).checks {
        (check.run)(tree, id, sink);
    }
}

pub fn validate_node(tree: &Tree, id: NodeId) -> Vec<Diagnostic> {
    let mut sink = DiagnosticSink::new();
    validate_into(tree, id, &mut sink);
    sink.into_vec()
}

/// Validates every node under `root`, pre-order, in a single pass.
pub fn validate_tree(tree: &Tree, root: NodeId) -> Vec<Diagnostic> {
    let mut sink = DiagnosticSink::new();
    let mut visited = 0usize;
    for id in tree.walk(root) {
        validate_into(tree, id, &mut sink);
        visited += 1;
    }
    debug!(
        "validated {} nodes under {}: {} diagnostics",
        visited,
        root,
        sink.len()
    );
    sink.into_vec()
}
