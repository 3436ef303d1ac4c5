//! # trellis
//!
//! A declarative node-schema system for C-family syntax trees. Node kinds are declared
//! once as [`schema::NodeTemplate`]s; generation resolves them into an immutable
//! [`Schema`], and a [`Tree`] interprets that schema at runtime: typed field access,
//! exclusive child ownership, fluent list accessors, raw-form codecs for operator
//! fields, structural validation and derived accessors.
//!
//! ```rust
//! use trellis::{nodes::{Try, TypedNode}, Tree};
//!
//! let mut tree = Tree::standard().unwrap();
//! let body = tree.build("Block").finish().unwrap();
//! let stmt = Try::build(&mut tree).child("body", body).finish().unwrap();
//! let diagnostics = tree.validate_tree(stmt);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].node, stmt);
//! ```

pub use crate::derived::DerivedValue;
pub use crate::errors::{ErrorType, Result, TrellisError};
pub use crate::operators::{BinaryOperator, Operator, OperatorCategory, UnaryOperator};
pub use crate::schema::{Family, Schema, SchemaBuilder};
pub use crate::tree::{ListAccessor, NodeId, Tree};
pub use crate::validation::Diagnostic;

pub mod cli;
pub mod codec;
pub mod derived;
pub mod errors;
pub mod nodes;
pub mod operators;
pub mod schema;
pub mod tree;
pub mod validation;
