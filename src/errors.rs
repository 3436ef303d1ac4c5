//! Unified error type for schema generation, tree mutation and raw-form decoding.
//!
//! Three failure families live here, each with its own stable diagnostic code:
//!
//! - `trellis::schema`: the declarations themselves are malformed. Raised by
//!   [`SchemaBuilder::generate`](crate::schema::SchemaBuilder::generate) and never by a
//!   running tree.
//! - `trellis::contract`: a mutation would break a node's contract (absent required
//!   field, child of the wrong family, data of the wrong type, a cycle).
//! - `trellis::raw_form`: text handed to a raw-form codec is absent or unknown.
//!
//! Structural findings from additional checks are *not* errors; see
//! [`validation::Diagnostic`](crate::validation::Diagnostic).

use miette::Diagnostic;
use thiserror::Error;

/// Type-safe classification of a [`TrellisError`], handy for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Schema,
    Contract,
    RawForm,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Schema => "Schema",
            ErrorType::Contract => "Contract",
            ErrorType::RawForm => "RawForm",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TrellisError {
    /// A node template declaration is malformed.
    #[error("schema error in `{kind}`: {message}")]
    #[diagnostic(
        code(trellis::schema),
        help("fix the node template declaration; schema errors abort generation")
    )]
    Schema { kind: String, message: String },

    /// A tree mutation would leave a node violating its declared contract.
    #[error("contract violation on `{kind}.{field}`: {message}")]
    #[diagnostic(code(trellis::contract))]
    ContractViolation {
        kind: String,
        field: String,
        message: String,
    },

    /// Text does not decode to any value of a closed enumeration.
    #[error("malformed raw form for `{field}`: {message}")]
    #[diagnostic(
        code(trellis::raw_form),
        help("expected one of the symbols listed by `trellis operators`")
    )]
    MalformedRawForm {
        field: String,
        text: Option<String>,
        message: String,
    },
}

impl TrellisError {
    pub fn schema(kind: impl Into<String>, message: impl Into<String>) -> Self {
        TrellisError::Schema {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn contract(
        kind: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TrellisError::ContractViolation {
            kind: kind.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a raw-form error. `field` names the decoded field or operator kind.
    pub fn malformed(
        field: impl Into<String>,
        text: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        TrellisError::MalformedRawForm {
            field: field.into(),
            text: text.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            TrellisError::Schema { .. } => ErrorType::Schema,
            TrellisError::ContractViolation { .. } => ErrorType::Contract,
            TrellisError::MalformedRawForm { .. } => ErrorType::RawForm,
        }
    }

    /// Rewrites the field label of a raw-form error, leaving other errors untouched.
    ///
    /// Codecs only know which operator family they decode; the tree knows the
    /// `Kind.field` the text was destined for.
    pub(crate) fn in_field(self, label: String) -> Self {
        match self {
            TrellisError::MalformedRawForm { text, message, .. } => {
                TrellisError::MalformedRawForm {
                    field: label,
                    text,
                    message,
                }
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrellisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_kind_and_field() {
        let err = TrellisError::contract("If", "condition", "required field cannot be absent");
        assert_eq!(
            err.to_string(),
            "contract violation on `If.condition`: required field cannot be absent"
        );
        assert_eq!(err.error_type(), ErrorType::Contract);
    }

    #[test]
    fn test_in_field_only_touches_raw_form_errors() {
        let raw = TrellisError::malformed("binary operator", Some("@@"), "unknown binary operator: @@")
            .in_field("BinaryExpression.operator".to_string());
        assert!(matches!(
            raw,
            TrellisError::MalformedRawForm { ref field, .. } if field == "BinaryExpression.operator"
        ));

        let schema = TrellisError::schema("If", "bad").in_field("x".to_string());
        assert_eq!(schema, TrellisError::schema("If", "bad"));
    }

    #[test]
    fn test_diagnostic_codes_are_stable() {
        let err = TrellisError::malformed("unary operator", None, "missing operator");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("trellis::raw_form"));
    }
}
