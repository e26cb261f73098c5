//! Schema errors: unbound labels/relationship types, unmapped
//! properties, and structural defects found while validating a loaded
//! schema document. Structured, named-field variants (not a single
//! string), in the teacher's `GraphSchemaError` style.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("no node schema found for label `{label}`")]
    UnboundLabel { label: String },

    #[error("no relationship schema found for type `{rel_type}`")]
    UnboundRelType { rel_type: String },

    #[error("property `{property}` is not mapped for `{label}`")]
    UnmappedProperty { label: String, property: String },

    #[error("relationship `{rel_type}` source key column `{column}` is not declared on table `{table}`")]
    DanglingSourceKey {
        rel_type: String,
        table: String,
        column: String,
    },

    #[error("relationship `{rel_type}` target key column `{column}` is not declared on table `{table}`")]
    DanglingTargetKey {
        rel_type: String,
        table: String,
        column: String,
    },

    #[error("label `{label}` is declared more than once")]
    DuplicateLabel { label: String },

    #[error("relationship type `{rel_type}` is declared more than once")]
    DuplicateRelType { rel_type: String },

    #[error("weighted path translation requires `weight_property` on relationship `{rel_type}`")]
    MissingWeightProperty { rel_type: String },

    #[error("failed to parse schema document: {message}")]
    InvalidDocument { message: String },
}
