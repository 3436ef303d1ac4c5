//! Closed operator registries for binary and unary expressions.
//!
//! Every operator has exactly one canonical symbol, and every symbol maps back to exactly
//! one operator of its registry. Lookup misses are reported by the raw-form codecs in
//! [`crate::codec`]; here they are plain `None`.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::Serialize;

/// Which registry an operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorCategory {
    Binary,
    Unary,
}

impl OperatorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorCategory::Binary => "binary",
            OperatorCategory::Unary => "unary",
        }
    }
}

impl fmt::Display for OperatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable registry entry: the symbol and the category it was registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OperatorDescriptor {
    pub symbol: &'static str,
    pub category: OperatorCategory,
}

/// Shared surface of both registries.
pub trait Operator: Copy + Eq + fmt::Debug + 'static {
    const CATEGORY: OperatorCategory;

    /// Every member of the registry, in declaration order.
    fn all() -> &'static [Self];

    fn symbol(self) -> &'static str;

    /// Exact, case-sensitive lookup. Callers trim before calling.
    fn from_symbol(symbol: &str) -> Option<Self>;

    fn descriptor(self) -> OperatorDescriptor {
        OperatorDescriptor {
            symbol: self.symbol(),
            category: Self::CATEGORY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    PlusAssign,
    MinusAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    BitwiseShiftRightAssign,
    Assign,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equals,
    NotEquals,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    ShiftLeft,
    ShiftRight,
    BitwiseShiftRight,
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 31] = [
        BinaryOperator::PlusAssign,
        BinaryOperator::MinusAssign,
        BinaryOperator::MultiplyAssign,
        BinaryOperator::DivideAssign,
        BinaryOperator::RemainderAssign,
        BinaryOperator::AndAssign,
        BinaryOperator::XorAssign,
        BinaryOperator::OrAssign,
        BinaryOperator::ShiftLeftAssign,
        BinaryOperator::ShiftRightAssign,
        BinaryOperator::BitwiseShiftRightAssign,
        BinaryOperator::Assign,
        BinaryOperator::LogicalOr,
        BinaryOperator::LogicalAnd,
        BinaryOperator::BitwiseOr,
        BinaryOperator::BitwiseXor,
        BinaryOperator::BitwiseAnd,
        BinaryOperator::Equals,
        BinaryOperator::NotEquals,
        BinaryOperator::Greater,
        BinaryOperator::GreaterOrEqual,
        BinaryOperator::Less,
        BinaryOperator::LessOrEqual,
        BinaryOperator::ShiftLeft,
        BinaryOperator::ShiftRight,
        BinaryOperator::BitwiseShiftRight,
        BinaryOperator::Plus,
        BinaryOperator::Minus,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Remainder,
    ];

    /// True for `=` and every compound assignment.
    pub fn is_assignment(self) -> bool {
        self.symbol().ends_with('=')
            && !matches!(
                self,
                BinaryOperator::Equals
                    | BinaryOperator::NotEquals
                    | BinaryOperator::GreaterOrEqual
                    | BinaryOperator::LessOrEqual
            )
    }
}

impl Operator for BinaryOperator {
    const CATEGORY: OperatorCategory = OperatorCategory::Binary;

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::PlusAssign => "+=",
            BinaryOperator::MinusAssign => "-=",
            BinaryOperator::MultiplyAssign => "*=",
            BinaryOperator::DivideAssign => "/=",
            BinaryOperator::RemainderAssign => "%=",
            BinaryOperator::AndAssign => "&=",
            BinaryOperator::XorAssign => "^=",
            BinaryOperator::OrAssign => "|=",
            BinaryOperator::ShiftLeftAssign => "<<=",
            BinaryOperator::ShiftRightAssign => ">>=",
            BinaryOperator::BitwiseShiftRightAssign => ">>>=",
            BinaryOperator::Assign => "=",
            BinaryOperator::LogicalOr => "||",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::BitwiseShiftRight => ">>>",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        BINARY_BY_SYMBOL.get(symbol).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    BinaryNot,
    LogicalNot,
    UnaryPlus,
    UnaryMinus,
}

impl UnaryOperator {
    pub const ALL: [UnaryOperator; 4] = [
        UnaryOperator::BinaryNot,
        UnaryOperator::LogicalNot,
        UnaryOperator::UnaryPlus,
        UnaryOperator::UnaryMinus,
    ];
}

impl Operator for UnaryOperator {
    const CATEGORY: OperatorCategory = OperatorCategory::Unary;

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::BinaryNot => "~",
            UnaryOperator::LogicalNot => "!",
            UnaryOperator::UnaryPlus => "+",
            UnaryOperator::UnaryMinus => "-",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        UNARY_BY_SYMBOL.get(symbol).copied()
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn index_by_symbol<O: Operator>() -> HashMap<&'static str, O> {
    O::all().iter().map(|op| (op.symbol(), *op)).collect()
}

lazy_static! {
    static ref BINARY_BY_SYMBOL: HashMap<&'static str, BinaryOperator> = index_by_symbol();
    static ref UNARY_BY_SYMBOL: HashMap<&'static str, UnaryOperator> = index_by_symbol();
}

/// All descriptors of both registries, binary first.
pub fn descriptors() -> Vec<OperatorDescriptor> {
    BinaryOperator::ALL
        .iter()
        .map(|op| op.descriptor())
        .chain(UnaryOperator::ALL.iter().map(|op| op.descriptor()))
        .collect()
}
