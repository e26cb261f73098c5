//! Optimizer errors: a rule's failure to prove its own rewrite is
//! semantics-preserving. Structured per-rule (`Pass`) the way the
//! teacher's own optimizer error type names which pass failed, since
//! the driver isolates and reports rule failures individually rather
//! than aborting the whole optimization (see design notes on rule
//! isolation).

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Pass {
    FilterPushdown,
    PredicatePushdown,
    TimeRangeInjection,
    JoinReorder,
    IndexHint,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::FilterPushdown => "FilterPushdown",
            Pass::PredicatePushdown => "PredicatePushdown",
            Pass::TimeRangeInjection => "TimeRangeInjection",
            Pass::JoinReorder => "JoinReorder",
            Pass::IndexHint => "IndexHint",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    #[error("{pass}: could not prove the rewrite preserves plan semantics ({reason})")]
    EquivalenceUnproven { pass: Pass, reason: String },
}
