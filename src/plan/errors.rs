//! Plan-builder errors: unsupported source constructs and symbol
//! resolution failures discovered while lowering the AST.

use crate::schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("variable `{name}` is not bound by any earlier MATCH, UNWIND, or WITH")]
    UnboundVariable { name: String },

    #[error("{construct} is not supported by the plan builder")]
    UnsupportedConstruct { construct: String },

    #[error("variable-length pattern has min={min} greater than max={max}")]
    PatternMalformed { min: u32, max: u32 },

    #[error("weighted path translation requires `weight_property` on relationship `{rel_type}`")]
    MissingWeightProperty { rel_type: String },

    #[error("shortestPath/allShortestPaths requires a positive max_length bound")]
    NonPositiveMaxLength,

    #[error("plan exceeds the maximum of {max} nodes")]
    TooManyNodes { max: usize },
}
