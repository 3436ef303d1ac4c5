//! Raw-form codecs: lossless text conversions for data fields with custom syntax.
//!
//! A codec is a pair of pure functions bound to a data field by name. `parse` trims its
//! input and rejects anything outside the closed enumeration; `generate` is total over
//! the enumeration. For every value `v`, `parse(generate(v)) == v`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::errors::{Result, TrellisError};
use crate::operators::{BinaryOperator, Operator, UnaryOperator};
use crate::schema::{DataType, DataValue};

/// Decodes an operator symbol from its raw form.
///
/// # Examples
///
/// ```rust
/// use trellis::codec::parse_operator;
/// use trellis::operators::BinaryOperator;
/// let op: BinaryOperator = parse_operator(Some(" += ")).unwrap();
/// assert_eq!(op, BinaryOperator::PlusAssign);
/// assert!(parse_operator::<BinaryOperator>(Some("@@")).is_err());
/// assert!(parse_operator::<BinaryOperator>(None).is_err());
/// ```
pub fn parse_operator<O: Operator>(text: Option<&str>) -> Result<O> {
    let label = format!("{} operator", O::CATEGORY);
    let Some(text) = text else {
        return Err(TrellisError::malformed(label, None, "missing operator"));
    };
    let trimmed = text.trim();
    O::from_symbol(trimmed).ok_or_else(|| {
        TrellisError::malformed(
            label,
            Some(text),
            format!("unknown {} operator: {}", O::CATEGORY, trimmed),
        )
    })
}

pub fn generate_operator<O: Operator>(op: O) -> &'static str {
    op.symbol()
}

type ParseFn = fn(Option<&str>) -> Result<DataValue>;
type GenerateFn = fn(&DataValue) -> Option<String>;

/// A parse/generate pair registered alongside a data field declaration.
///
/// The erased functions work on [`DataValue`]; `generate` returns `None` only when handed
/// a value of a different data type, which the tree never does because it type-checks
/// every data assignment.
#[derive(Clone, Copy)]
pub struct RawFormCodec {
    pub name: &'static str,
    pub data_type: DataType,
    parse: ParseFn,
    generate: GenerateFn,
}

impl RawFormCodec {
    pub const fn new(
        name: &'static str,
        data_type: DataType,
        parse: ParseFn,
        generate: GenerateFn,
    ) -> Self {
        Self {
            name,
            data_type,
            parse,
            generate,
        }
    }

    pub fn parse(&self, text: Option<&str>) -> Result<DataValue> {
        (self.parse)(text)
    }

    pub fn generate(&self, value: &DataValue) -> Option<String> {
        (self.generate)(value)
    }
}

impl fmt::Debug for RawFormCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFormCodec")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .finish()
    }
}

impl PartialEq for RawFormCodec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}

impl Serialize for RawFormCodec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

pub const BINARY_OPERATOR: RawFormCodec = RawFormCodec::new(
    "binary_operator",
    DataType::BinaryOperator,
    |text| parse_operator::<BinaryOperator>(text).map(DataValue::BinaryOperator),
    |value| match value {
        DataValue::BinaryOperator(op) => Some(generate_operator(*op).to_string()),
        _ => None,
    },
);

pub const UNARY_OPERATOR: RawFormCodec = RawFormCodec::new(
    "unary_operator",
    DataType::UnaryOperator,
    |text| parse_operator::<UnaryOperator>(text).map(DataValue::UnaryOperator),
    |value| match value {
        DataValue::UnaryOperator(op) => Some(generate_operator(*op).to_string()),
        _ => None,
    },
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorType;

    #[test]
    fn test_missing_text_names_the_operator_kind() {
        let err = parse_operator::<UnaryOperator>(None).unwrap_err();
        match err {
            TrellisError::MalformedRawForm { field, text, message } => {
                assert_eq!(field, "unary operator");
                assert_eq!(text, None);
                assert_eq!(message, "missing operator");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_symbol_keeps_offending_text() {
        let err = parse_operator::<BinaryOperator>(Some(" @@ ")).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::RawForm);
        match err {
            TrellisError::MalformedRawForm { text, message, .. } => {
                assert_eq!(text.as_deref(), Some(" @@ "));
                assert_eq!(message, "unknown binary operator: @@");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_erased_generate_rejects_foreign_values() {
        assert_eq!(BINARY_OPERATOR.generate(&DataValue::Bool(true)), None);
        assert_eq!(
            UNARY_OPERATOR.generate(&DataValue::UnaryOperator(UnaryOperator::BinaryNot)),
            Some("~".to_string())
        );
    }
}
