//! # Standard C-Family Node Catalogue
//!
//! The declarations for statements, expressions and the family-less helper kinds of a
//! C-family (Java-like) syntax tree. Single child fields without an explicit kind accept
//! any `Expression`.
//!
//! The generated schema is built once per process and shared by every
//! [`Tree::standard`](crate::tree::Tree::standard).
//!
//! | Group       | Kinds                                                                 |
//! |-------------|-----------------------------------------------------------------------|
//! | statements  | Assert, Catch, Block, DoWhile, While, For, ForEach, If, Synchronized,  |
//! |             | Try, VariableDeclaration, EmptyStatement, LabelledStatement, Switch,  |
//! |             | Case, Default                                                         |
//! | expressions | InlineIfExpression, IncrementExpression, BinaryExpression,            |
//! |             | UnaryExpression, Cast, IdentifierExpression, InstanceOf,              |
//! |             | ConstructorInvocation, MethodInvocation, Select, ArrayAccess,         |
//! |             | ArrayCreation, ArrayInitializer, This, Super, ClassLiteral            |
//! | helpers     | VariableDeclarationEntry, Identifier, TypeVariable, TypeReference,    |
//! |             | TypeReferencePart, TypeArguments, ClassBody, ArrayDimension,          |
//! |             | KeywordModifier, Modifiers                                            |

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::{
    DataType, DataValue, Family, Field, InitialValue, NodeTemplate, Schema, SchemaBuilder,
    WildcardKind,
};
use crate::codec;
use crate::derived;
use crate::errors::{Result, TrellisError};
use crate::validation::checks;

const EXPR: &str = "Expression";
const STMT: &str = "Statement";

/// Upper bound on `TypeReference.array_dimensions`, as in the JVM class file format.
pub const MAX_ARRAY_DIMENSIONS: i64 = 255;

static STANDARD: Lazy<std::result::Result<Arc<Schema>, TrellisError>> =
    Lazy::new(|| SchemaBuilder::new().templates(templates()).generate().map(Arc::new));

/// The shared standard schema.
pub fn schema() -> Result<Arc<Schema>> {
    STANDARD.clone()
}

/// Every standard template, statements first.
pub fn templates() -> Vec<NodeTemplate> {
    let mut all = statements();
    all.extend(expressions());
    all.extend(helpers());
    all
}

fn statement(name: &'static str) -> NodeTemplate {
    NodeTemplate::new(name).extending(Family::Statement)
}

fn expression(name: &'static str) -> NodeTemplate {
    NodeTemplate::new(name).extending(Family::Expression)
}

// ============================================================================
// STATEMENTS
// ============================================================================

fn statements() -> Vec<NodeTemplate> {
    vec![
        statement("Assert")
            .field(Field::child("assertion", EXPR).required())
            .field(Field::child("message", EXPR)),
        statement("Catch")
            .field(Field::child("exception_declaration", "VariableDeclaration").required())
            .field(Field::child("body", "Block").required())
            .check("catch_declares_one_variable", checks::check_catch_declares_one_variable),
        statement("Block").field(Field::children("contents", STMT)),
        statement("DoWhile")
            .field(Field::child("condition", EXPR).required())
            .field(Field::child("statement", STMT).required()),
        statement("While")
            .field(Field::child("condition", EXPR).required())
            .field(Field::child("statement", STMT).required()),
        statement("For")
            .field(Field::child("initialization", STMT))
            .field(Field::child("condition", EXPR))
            .field(Field::children("increments", STMT))
            .field(Field::child("statement", STMT).required()),
        statement("ForEach")
            .field(Field::child("element", "VariableDeclaration").required())
            .field(Field::child("iterable", EXPR).required())
            .field(Field::child("statement", STMT).required()),
        statement("If")
            .field(Field::child("condition", EXPR).required())
            .field(Field::child("statement", STMT).required())
            .field(Field::child("else_statement", STMT)),
        statement("Synchronized")
            .field(Field::child("lock", EXPR).required())
            .field(Field::child("body", "Block").required()),
        statement("Try")
            .field(Field::child("body", "Block").required())
            .field(Field::children("catches", "Catch"))
            .field(Field::child("finally", "Block"))
            .check("not_lone_try", checks::check_not_lone_try),
        statement("VariableDeclaration")
            .field(Field::child("type_reference", "TypeReference").required())
            .field(Field::children("variables", "VariableDeclarationEntry")),
        statement("EmptyStatement"),
        statement("LabelledStatement")
            .field(Field::child("label", "Identifier").required())
            .field(Field::child("statement", STMT).required()),
        statement("Switch")
            .field(Field::child("condition", EXPR).required())
            .field(Field::child("body", "Block").required()),
        statement("Case").field(Field::child("condition", EXPR).required()),
        statement("Default"),
    ]
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

fn expressions() -> Vec<NodeTemplate> {
    vec![
        expression("InlineIfExpression")
            .field(Field::child("condition", EXPR).required())
            .field(Field::child("if_true", EXPR).required())
            .field(Field::child("if_false", EXPR).required()),
        expression("IncrementExpression")
            .field(Field::child("operand", EXPR).required())
            .field(
                Field::data("decrement", DataType::Bool)
                    .initial(InitialValue::Data(DataValue::Bool(false))),
            )
            .field(
                Field::data("prefix", DataType::Bool)
                    .initial(InitialValue::Data(DataValue::Bool(false))),
            ),
        expression("BinaryExpression")
            .field(Field::child("left", EXPR).required())
            .field(Field::child("right", EXPR).required())
            .field(
                Field::data("operator", DataType::BinaryOperator)
                    .required()
                    .raw_form(codec::BINARY_OPERATOR),
            ),
        expression("UnaryExpression")
            .field(Field::child("operand", EXPR).required())
            .field(
                Field::data("operator", DataType::UnaryOperator)
                    .required()
                    .raw_form(codec::UNARY_OPERATOR),
            ),
        expression("Cast")
            .field(Field::child("type_reference", "TypeReference").required())
            .field(Field::child("operand", EXPR).required()),
        expression("IdentifierExpression")
            .field(Field::child("identifier", "Identifier").required()),
        expression("InstanceOf")
            .field(Field::child("object_reference", EXPR).required())
            .field(Field::child("type_reference", "TypeReference").required()),
        expression("ConstructorInvocation")
            .field(Field::child("qualifier", EXPR))
            .field(Field::child("constructor_type_arguments", "TypeArguments"))
            .field(Field::child("type_reference", "TypeReference").required())
            .field(Field::children("arguments", EXPR))
            .field(Field::child("anonymous_class_body", "ClassBody")),
        expression("MethodInvocation")
            .field(Field::child("operand", EXPR))
            .field(Field::child("method_type_arguments", "TypeArguments"))
            .field(Field::child("name", "Identifier").required())
            .field(Field::children("arguments", EXPR)),
        expression("Select")
            .field(Field::child("operand", EXPR).required())
            .field(Field::child("identifier", "Identifier").required()),
        expression("ArrayAccess")
            .field(Field::child("operand", EXPR).required())
            .field(Field::child("index_expression", EXPR).required()),
        expression("ArrayCreation")
            .field(Field::child("component_type_reference", "TypeReference").required())
            .field(Field::children("dimensions", "ArrayDimension"))
            .field(Field::child("initializer", "ArrayInitializer")),
        expression("ArrayInitializer").field(Field::children("expressions", EXPR)),
        expression("This").field(Field::child("qualifier", "TypeReference")),
        expression("Super").field(Field::child("qualifier", "TypeReference")),
        expression("ClassLiteral")
            .field(Field::child("type_reference", "TypeReference").required()),
    ]
}

// ============================================================================
// HELPERS
// ============================================================================

fn helpers() -> Vec<NodeTemplate> {
    vec![
        NodeTemplate::new("VariableDeclarationEntry")
            .field(Field::child("name", "Identifier").required())
            .field(Field::child("initializer", EXPR)),
        NodeTemplate::new("Identifier").field(Field::data("name", DataType::Str).required()),
        NodeTemplate::new("TypeVariable")
            .field(Field::child("name", "Identifier").required())
            .field(Field::children("extending", "TypeReference")),
        NodeTemplate::new("TypeReference")
            .field(
                Field::data("wildcard", DataType::Wildcard)
                    .required()
                    .initial(InitialValue::Data(DataValue::Wildcard(WildcardKind::None))),
            )
            .field(
                Field::data("array_dimensions", DataType::Int)
                    .bounded(0, MAX_ARRAY_DIMENSIONS)
                    .initial(InitialValue::Data(DataValue::Int(0))),
            )
            .field(Field::children("parts", "TypeReferencePart"))
            .accessor("type_name", derived::derive_type_name)
            .accessor("has_generics", derived::derive_has_generics)
            .accessor("generics", derived::derive_generics),
        NodeTemplate::new("TypeReferencePart")
            .field(Field::child("identifier", "Identifier").required())
            .field(
                Field::child("type_arguments", "TypeArguments")
                    .required()
                    .initial(InitialValue::NewNode("TypeArguments")),
            )
            .accessor("type_name", derived::derive_part_type_name)
            .accessor("generics", derived::derive_part_generics),
        NodeTemplate::new("TypeArguments").field(Field::children("generics", "TypeReference")),
        NodeTemplate::new("ClassBody"),
        NodeTemplate::new("ArrayDimension").field(Field::child("dimension", EXPR)),
        NodeTemplate::new("KeywordModifier")
            .field(Field::data("name", DataType::Str).required()),
        NodeTemplate::new("Modifiers").field(Field::data_list("keywords", DataType::Str)),
    ]
}
