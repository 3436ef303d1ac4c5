//! Field classification: what a declaration turns into once generated.

use serde::Serialize;

use super::{Field, FieldType, InitialValue, Multiplicity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldCategory {
    SingleChild,
    ListChild,
    SingleData,
    ListData,
}

impl FieldCategory {
    pub fn is_child(&self) -> bool {
        matches!(self, FieldCategory::SingleChild | FieldCategory::ListChild)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldCategory::ListChild | FieldCategory::ListData)
    }
}

/// One piece of generated API surface for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccessorShape {
    Getter,
    Setter,
    ListAccessor,
    /// The field must be supplied when the node is built.
    ConstructorParam,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: FieldCategory,
    /// Only single fields that are not required may be absent.
    pub nullable: bool,
    pub initial: Option<InitialValue>,
    /// Participates in structural equality and in the copy traversal.
    pub structural: bool,
    pub accessors: Vec<AccessorShape>,
}

/// Classifies a declared field. Stable: the same declaration always yields the same result.
///
/// # Examples
///
/// ```rust
/// use trellis::schema::{classify, AccessorShape, Field, FieldCategory};
/// let c = classify(&Field::child("condition", "Expression").required());
/// assert_eq!(c.category, FieldCategory::SingleChild);
/// assert!(!c.nullable);
/// assert!(c.accessors.contains(&AccessorShape::ConstructorParam));
/// ```
pub fn classify(field: &Field) -> Classification {
    let category = match (&field.field_type, field.multiplicity) {
        (FieldType::Child(_), Multiplicity::Single) => FieldCategory::SingleChild,
        (FieldType::Child(_), Multiplicity::List) => FieldCategory::ListChild,
        (FieldType::Data(_), Multiplicity::Single) => FieldCategory::SingleData,
        (FieldType::Data(_), Multiplicity::List) => FieldCategory::ListData,
    };

    let accessors = if category.is_list() {
        vec![AccessorShape::Getter, AccessorShape::ListAccessor]
    } else if field.required && field.initial.is_none() {
        vec![
            AccessorShape::Getter,
            AccessorShape::Setter,
            AccessorShape::ConstructorParam,
        ]
    } else {
        vec![AccessorShape::Getter, AccessorShape::Setter]
    };

    Classification {
        category,
        nullable: !category.is_list() && !field.required,
        initial: field.initial.clone(),
        structural: category.is_child(),
        accessors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, DataValue};

    #[test]
    fn test_list_fields_are_never_nullable() {
        let c = classify(&Field::children("contents", "Statement"));
        assert_eq!(c.category, FieldCategory::ListChild);
        assert!(!c.nullable);
        assert_eq!(c.accessors, vec![AccessorShape::Getter, AccessorShape::ListAccessor]);

        let c = classify(&Field::data_list("keywords", DataType::Str));
        assert_eq!(c.category, FieldCategory::ListData);
        assert!(!c.structural);
    }

    #[test]
    fn test_data_fields_are_not_structural() {
        let c = classify(&Field::data("prefix", DataType::Bool));
        assert_eq!(c.category, FieldCategory::SingleData);
        assert!(c.nullable);
        assert!(!c.structural);
    }

    #[test]
    fn test_initial_value_removes_constructor_param() {
        let field = Field::data("wildcard", DataType::Wildcard)
            .required()
            .initial(InitialValue::Data(DataValue::Wildcard(Default::default())));
        let c = classify(&field);
        assert!(!c.nullable);
        assert!(!c.accessors.contains(&AccessorShape::ConstructorParam));
        assert!(c.initial.is_some());
    }
}
