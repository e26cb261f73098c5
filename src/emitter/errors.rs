//! Emitter errors: internal invariant violations only.
//!
//! The emitter is a pure function over an already-validated, already-
//! optimized plan (spec.md §4.F); every variant here indicates a plan
//! the builder/optimizer should never have produced, not a user error -
//! the "assertion class" bucket in spec.md §7's error taxonomy.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmitError {
    #[error("cannot emit a graph pattern with no node or edge tables")]
    EmptyGraphDef,

    #[error("join has no common variable to key on and no supported cartesian-product form")]
    UnsupportedJoinShape,

    #[error("plan references variable `{name}` with no pattern or projection binding")]
    UnboundVariable { name: String },
}
