//! # Typed Node Handles
//!
//! Thin, `Copy` wrappers over [`NodeId`] for every kind of the standard catalogue, with
//! one getter per field, a setter per single field and a `*_mut` list accessor per list
//! field. Single child setters are typed over the slot: a family slot takes anything that
//! converts into [`Statement`] or [`Expression`], a kind slot takes that kind's handle, and
//! `clear_*` empties an optional slot. Handles are obtained through [`TypedNode::cast`], which checks the node's kind,
//! or through the generic [`Tree::cast`].
//!
//! Family membership is expressed by the marker traits [`StatementNode`] and
//! [`ExpressionNode`]; a kind implements at most one of them.
//!
//! ```rust
//! use trellis::nodes::{Block, If, TypedNode};
//! use trellis::Tree;
//!
//! let mut tree = Tree::standard().unwrap();
//! let name = tree.build("Identifier").data("name", "ready").finish().unwrap();
//! let cond = tree.build("IdentifierExpression").child("identifier", name).finish().unwrap();
//! let body = Block::build(&mut tree).finish().unwrap();
//! let stmt = If::build(&mut tree)
//!     .child("condition", cond)
//!     .child("statement", body)
//!     .finish()
//!     .unwrap();
//!
//! let stmt = If::cast(&tree, stmt).unwrap();
//! assert_eq!(stmt.statement(&tree).unwrap(), Some(body));
//! assert_eq!(stmt.else_statement(&tree).unwrap(), None);
//! assert!(Block::cast(&tree, stmt.id()).is_none());
//! ```

use crate::derived;
use crate::errors::Result;
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::schema::{DataValue, Family, WildcardKind};
use crate::tree::{ListAccessor, ListBinding, NodeBuilder, NodeId, Tree};

// ============================================================================
// TRAITS
// ============================================================================

/// A handle statically tied to one node kind.
pub trait TypedNode: Copy + Into<NodeId> {
    const KIND: &'static str;

    fn id(self) -> NodeId;

    /// `Some` when `id` is a node of this kind.
    fn cast(tree: &Tree, id: NodeId) -> Option<Self>;
}

/// Kinds extending the statement family.
pub trait StatementNode: TypedNode {
    fn as_statement(self) -> Statement {
        Statement(self.id())
    }
}

/// Kinds extending the expression family.
pub trait ExpressionNode: TypedNode {
    fn as_expression(self) -> Expression {
        Expression(self.id())
    }
}

/// Any node of the statement family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Statement(NodeId);

/// Any node of the expression family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expression(NodeId);

macro_rules! family_handle {
    ($handle:ident, $family:expr) => {
        impl $handle {
            pub fn cast(tree: &Tree, id: NodeId) -> Option<Self> {
                (tree.family(id) == Some($family)).then_some(Self(id))
            }

            pub fn id(self) -> NodeId {
                self.0
            }
        }

        impl From<$handle> for NodeId {
            fn from(handle: $handle) -> NodeId {
                handle.0
            }
        }
    };
}

family_handle!(Statement, Family::Statement);
family_handle!(Expression, Family::Expression);

/// Scalar types a data field getter can return.
pub trait FromDataValue: Sized {
    fn from_data_value(value: &DataValue) -> Option<Self>;
}

impl FromDataValue for bool {
    fn from_data_value(value: &DataValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromDataValue for i64 {
    fn from_data_value(value: &DataValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromDataValue for String {
    fn from_data_value(value: &DataValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromDataValue for BinaryOperator {
    fn from_data_value(value: &DataValue) -> Option<Self> {
        value.as_binary_operator()
    }
}

impl FromDataValue for UnaryOperator {
    fn from_data_value(value: &DataValue) -> Option<Self> {
        value.as_unary_operator()
    }
}

impl FromDataValue for WildcardKind {
    fn from_data_value(value: &DataValue) -> Option<Self> {
        value.as_wildcard()
    }
}

impl Tree {
    /// Typed view of `id`, when it has the handle's kind.
    pub fn cast<T: TypedNode>(&self, id: NodeId) -> Option<T> {
        T::cast(self, id)
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

macro_rules! typed_nodes {
    (@family $handle:ident Statement) => {
        impl StatementNode for $handle {}

        impl From<$handle> for Statement {
            fn from(handle: $handle) -> Statement {
                handle.as_statement()
            }
        }
    };
    (@family $handle:ident Expression) => {
        impl ExpressionNode for $handle {}

        impl From<$handle> for Expression {
            fn from(handle: $handle) -> Expression {
                handle.as_expression()
            }
        }
    };
    (@family $handle:ident Helper) => {};

    (@field child $field:ident : $ty:ty) => {
        pub fn $field(self, tree: &Tree) -> Result<Option<NodeId>> {
            tree.child(self.0, stringify!($field))
        }

        paste::paste! {
            pub fn [<set_ $field>](self, tree: &mut Tree, child: impl Into<$ty>) -> Result<()> {
                let child: $ty = child.into();
                tree.set_child(self.0, stringify!($field), Some(child.into()))
            }

            /// Empties the slot; fails when the field is required.
            pub fn [<clear_ $field>](self, tree: &mut Tree) -> Result<()> {
                tree.set_child(self.0, stringify!($field), None)
            }
        }
    };

    (@field children $field:ident) => {
        pub fn $field(self, tree: &Tree) -> Result<&[NodeId]> {
            tree.children(self.0, stringify!($field))
        }

        paste::paste! {
            pub fn [<$field _mut>](self, tree: &mut Tree) -> Result<ListAccessor<'_>> {
                tree.list(self.0, stringify!($field))
            }
        }
    };

    (@field data $field:ident : $ty:ty) => {
        pub fn $field(self, tree: &Tree) -> Result<Option<$ty>> {
            Ok(tree
                .data(self.0, stringify!($field))?
                .and_then(<$ty as FromDataValue>::from_data_value))
        }

        paste::paste! {
            pub fn [<set_ $field>](self, tree: &mut Tree, value: Option<$ty>) -> Result<()> {
                tree.set_data(self.0, stringify!($field), value.map(DataValue::from))
            }
        }
    };

    (@field raw $field:ident : $ty:ty) => {
        typed_nodes!(@field data $field : $ty);

        paste::paste! {
            /// Text form through the field's raw-form codec.
            pub fn [<raw_ $field>](self, tree: &Tree) -> Result<Option<String>> {
                tree.raw_form(self.0, stringify!($field))
            }

            pub fn [<set_raw_ $field>](self, tree: &mut Tree, text: Option<&str>) -> Result<()> {
                tree.set_raw_form(self.0, stringify!($field), text)
            }
        }
    };

    (@field values $field:ident : $ty:ty) => {
        pub fn $field(self, tree: &Tree) -> Result<Vec<$ty>> {
            Ok(tree
                .data_list(self.0, stringify!($field))?
                .iter()
                .filter_map(<$ty as FromDataValue>::from_data_value)
                .collect())
        }

        paste::paste! {
            pub fn [<$field _mut>](self, tree: &mut Tree) -> Result<ListAccessor<'_>> {
                tree.list(self.0, stringify!($field))
            }
        }
    };

    ($(
        $(#[$meta:meta])*
        $handle:ident = $kind:literal : $family:ident {
            $( $cat:ident $field:ident $(: $ty:ty)? ; )*
        }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $handle(NodeId);

            impl TypedNode for $handle {
                const KIND: &'static str = $kind;

                fn id(self) -> NodeId {
                    self.0
                }

                fn cast(tree: &Tree, id: NodeId) -> Option<Self> {
                    (tree.kind_name(id) == $kind).then_some(Self(id))
                }
            }

            impl From<$handle> for NodeId {
                fn from(handle: $handle) -> NodeId {
                    handle.0
                }
            }

            typed_nodes!(@family $handle $family);

            impl $handle {
                /// Starts building a node of this kind.
                pub fn build(tree: &mut Tree) -> NodeBuilder<'_> {
                    tree.build($kind)
                }

                $( typed_nodes!(@field $cat $field $(: $ty)?); )*
            }
        )*
    };
}

typed_nodes! {
    // Statements
    Assert = "Assert": Statement {
        child assertion: Expression;
        child message: Expression;
    }
    Catch = "Catch": Statement {
        child exception_declaration: VariableDeclaration;
        child body: Block;
    }
    Block = "Block": Statement {
        children contents;
    }
    DoWhile = "DoWhile": Statement {
        child condition: Expression;
        child statement: Statement;
    }
    While = "While": Statement {
        child condition: Expression;
        child statement: Statement;
    }
    For = "For": Statement {
        child initialization: Statement;
        child condition: Expression;
        children increments;
        child statement: Statement;
    }
    ForEach = "ForEach": Statement {
        child element: VariableDeclaration;
        child iterable: Expression;
        child statement: Statement;
    }
    If = "If": Statement {
        child condition: Expression;
        child statement: Statement;
        child else_statement: Statement;
    }
    Synchronized = "Synchronized": Statement {
        child lock: Expression;
        child body: Block;
    }
    Try = "Try": Statement {
        child body: Block;
        children catches;
        child finally: Block;
    }
    VariableDeclaration = "VariableDeclaration": Statement {
        child type_reference: TypeReference;
        children variables;
    }
    EmptyStatement = "EmptyStatement": Statement {}
    LabelledStatement = "LabelledStatement": Statement {
        child label: Identifier;
        child statement: Statement;
    }
    Switch = "Switch": Statement {
        child condition: Expression;
        child body: Block;
    }
    Case = "Case": Statement {
        child condition: Expression;
    }
    /// The `default:` label of a switch. Named apart from the `Default` trait.
    DefaultCase = "Default": Statement {}

    // Expressions
    InlineIfExpression = "InlineIfExpression": Expression {
        child condition: Expression;
        child if_true: Expression;
        child if_false: Expression;
    }
    IncrementExpression = "IncrementExpression": Expression {
        child operand: Expression;
        data decrement: bool;
        data prefix: bool;
    }
    BinaryExpression = "BinaryExpression": Expression {
        child left: Expression;
        child right: Expression;
        raw operator: BinaryOperator;
    }
    UnaryExpression = "UnaryExpression": Expression {
        child operand: Expression;
        raw operator: UnaryOperator;
    }
    Cast = "Cast": Expression {
        child type_reference: TypeReference;
        child operand: Expression;
    }
    IdentifierExpression = "IdentifierExpression": Expression {
        child identifier: Identifier;
    }
    InstanceOf = "InstanceOf": Expression {
        child object_reference: Expression;
        child type_reference: TypeReference;
    }
    ConstructorInvocation = "ConstructorInvocation": Expression {
        child qualifier: Expression;
        child constructor_type_arguments: TypeArguments;
        child type_reference: TypeReference;
        children arguments;
        child anonymous_class_body: ClassBody;
    }
    MethodInvocation = "MethodInvocation": Expression {
        child operand: Expression;
        child method_type_arguments: TypeArguments;
        child name: Identifier;
        children arguments;
    }
    Select = "Select": Expression {
        child operand: Expression;
        child identifier: Identifier;
    }
    ArrayAccess = "ArrayAccess": Expression {
        child operand: Expression;
        child index_expression: Expression;
    }
    ArrayCreation = "ArrayCreation": Expression {
        child component_type_reference: TypeReference;
        children dimensions;
        child initializer: ArrayInitializer;
    }
    ArrayInitializer = "ArrayInitializer": Expression {
        children expressions;
    }
    This = "This": Expression {
        child qualifier: TypeReference;
    }
    Super = "Super": Expression {
        child qualifier: TypeReference;
    }
    ClassLiteral = "ClassLiteral": Expression {
        child type_reference: TypeReference;
    }

    // Helpers
    VariableDeclarationEntry = "VariableDeclarationEntry": Helper {
        child name: Identifier;
        child initializer: Expression;
    }
    Identifier = "Identifier": Helper {
        data name: String;
    }
    TypeVariable = "TypeVariable": Helper {
        child name: Identifier;
        children extending;
    }
    TypeReference = "TypeReference": Helper {
        data wildcard: WildcardKind;
        data array_dimensions: i64;
        children parts;
    }
    TypeReferencePart = "TypeReferencePart": Helper {
        child identifier: Identifier;
        child type_arguments: TypeArguments;
    }
    TypeArguments = "TypeArguments": Helper {
        children generics;
    }
    ClassBody = "ClassBody": Helper {}
    ArrayDimension = "ArrayDimension": Helper {
        child dimension: Expression;
    }
    KeywordModifier = "KeywordModifier": Helper {
        data name: String;
    }
    Modifiers = "Modifiers": Helper {
        values keywords: String;
    }
}

// ============================================================================
// DERIVED ACCESSORS
// ============================================================================

impl TypeReference {
    pub fn type_name(self, tree: &Tree) -> Result<String> {
        derived::type_name(tree, self.0)
    }

    pub fn has_generics(self, tree: &Tree) -> Result<bool> {
        derived::has_generics(tree, self.0)
    }

    /// The last part's generics, reported as owned by this reference.
    pub fn generics(self, tree: &Tree) -> Result<ListBinding> {
        derived::generics(tree, self.0)
    }

    pub fn generics_mut(self, tree: &mut Tree) -> Result<ListAccessor<'_>> {
        tree.generics(self.0)
    }
}

impl TypeReferencePart {
    pub fn type_name(self, tree: &Tree) -> Result<String> {
        derived::part_type_name(tree, self.0)
    }

    pub fn generics(self, tree: &Tree) -> Result<ListBinding> {
        derived::part_generics(tree, self.0)
    }

    pub fn generics_mut(self, tree: &mut Tree) -> Result<ListAccessor<'_>> {
        tree.generics(self.0)
    }
}

#[cfg(test)]
mod nodes_tests {
    use super::*;

    #[test]
    fn test_every_handle_names_a_standard_kind() {
        let schema = crate::schema::standard::schema().unwrap();
        for kind in [
            Assert::KIND,
            DefaultCase::KIND,
            BinaryExpression::KIND,
            TypeReferencePart::KIND,
            Modifiers::KIND,
        ] {
            assert!(schema.kind_id(kind).is_some(), "{kind}");
        }
        assert_eq!(DefaultCase::KIND, "Default");
    }

    #[test]
    fn test_family_casts() {
        let mut tree = Tree::standard().unwrap();
        let empty = EmptyStatement::build(&mut tree).finish().unwrap();
        assert!(Statement::cast(&tree, empty).is_some());
        assert!(Expression::cast(&tree, empty).is_none());
        let handle: EmptyStatement = tree.cast(empty).unwrap();
        assert_eq!(handle.as_statement().id(), empty);
    }

    #[test]
    fn test_family_slots_take_family_handles() {
        let mut tree = Tree::standard().unwrap();
        let id = Identifier::build(&mut tree).data("name", "ok").finish().unwrap();
        let cond = IdentifierExpression::build(&mut tree)
            .child("identifier", id)
            .finish()
            .unwrap();
        let body = EmptyStatement::build(&mut tree).finish().unwrap();
        let stmt = While::build(&mut tree)
            .child("condition", cond)
            .child("statement", body)
            .finish()
            .unwrap();
        let stmt = While::cast(&tree, stmt).unwrap();

        let block = Block::build(&mut tree).finish().unwrap();
        let block = Block::cast(&tree, block).unwrap();
        stmt.set_statement(&mut tree, block).unwrap();
        assert_eq!(stmt.statement(&tree).unwrap(), Some(block.id()));
        assert_eq!(tree.parent(body), None);

        let cond = IdentifierExpression::cast(&tree, cond).unwrap();
        let other = Identifier::build(&mut tree).data("name", "done").finish().unwrap();
        let other = Identifier::cast(&tree, other).unwrap();
        cond.set_identifier(&mut tree, other).unwrap();
        assert_eq!(cond.identifier(&tree).unwrap(), Some(other.id()));
        assert!(cond.clear_identifier(&mut tree).is_err());

        stmt.set_condition(&mut tree, cond).unwrap();
        assert_eq!(Statement::from(block).id(), block.id());
        assert_eq!(Expression::from(cond), cond.as_expression());
    }

    #[test]
    fn test_data_setters_round_through_the_tree() {
        let mut tree = Tree::standard().unwrap();
        let id = Identifier::build(&mut tree).data("name", "x").finish().unwrap();
        let operand = IdentifierExpression::build(&mut tree)
            .child("identifier", id)
            .finish()
            .unwrap();
        let inc = IncrementExpression::build(&mut tree)
            .child("operand", operand)
            .finish()
            .unwrap();
        let inc = IncrementExpression::cast(&tree, inc).unwrap();
        assert_eq!(inc.prefix(&tree).unwrap(), Some(false));
        inc.set_prefix(&mut tree, Some(true)).unwrap();
        assert_eq!(inc.prefix(&tree).unwrap(), Some(true));
    }

    #[test]
    fn test_raw_operator_accessors() {
        let mut tree = Tree::standard().unwrap();
        let id = Identifier::build(&mut tree).data("name", "flag").finish().unwrap();
        let operand = IdentifierExpression::build(&mut tree)
            .child("identifier", id)
            .finish()
            .unwrap();
        let not = UnaryExpression::build(&mut tree)
            .child("operand", operand)
            .data("operator", UnaryOperator::LogicalNot)
            .finish()
            .unwrap();
        let not = UnaryExpression::cast(&tree, not).unwrap();
        assert_eq!(not.raw_operator(&tree).unwrap().as_deref(), Some("!"));
        not.set_raw_operator(&mut tree, Some(" ~ ")).unwrap();
        assert_eq!(not.operator(&tree).unwrap(), Some(UnaryOperator::BinaryNot));
        assert!(not.set_raw_operator(&mut tree, None).is_err());
        assert_eq!(not.operator(&tree).unwrap(), Some(UnaryOperator::BinaryNot));
    }
}
