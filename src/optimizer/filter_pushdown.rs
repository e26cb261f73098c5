//! `FilterPushdown`: move a `Filter` below the `Join` it sits over,
//! onto whichever side already resolves every one of its free
//! variables (spec.md §4.E). The only multi-child node in the algebra
//! is `Join`, so "push below `GraphMatch`/`Join`" collapses to this one
//! case - a `Filter` directly over a leaf (`GraphMatch`, `Scan`,
//! `ShortestPaths`, `AllPaths`) is already as far down as it can go.

use super::errors::Pass;
use super::{OptimizerPass, OptimizerResult, Transformed};
use crate::plan::{JoinKind, LogicalPlan, PlanRef};
use crate::schema::SchemaMap;
use std::sync::Arc;

pub struct FilterPushdown;

impl OptimizerPass for FilterPushdown {
    fn pass(&self) -> Pass {
        Pass::FilterPushdown
    }

    fn try_rewrite<'a>(
        &self,
        node: &PlanRef<'a>,
        _schema: &SchemaMap,
    ) -> OptimizerResult<Transformed<PlanRef<'a>>> {
        let LogicalPlan::Filter { child, predicate } = node.as_ref() else {
            return Ok(Transformed::No(node.clone()));
        };
        let LogicalPlan::Join {
            left,
            right,
            keys,
            kind,
        } = child.as_ref()
        else {
            return Ok(Transformed::No(node.clone()));
        };

        // An outer join's preserved (null-supplying) side cannot
        // safely absorb a filter that would be evaluated before the
        // outer-join padding is introduced - refuse rather than
        // silently change semantics.
        if matches!(kind, JoinKind::LeftOuter) {
            return Ok(Transformed::No(node.clone()));
        }

        let vars = predicate.free_variables();
        let left_vars = left.output_variables();
        let right_vars = right.output_variables();

        if vars.iter().all(|v| left_vars.contains(v)) {
            let new_left = Arc::new(LogicalPlan::Filter {
                child: left.clone(),
                predicate: predicate.clone(),
            });
            return Ok(Transformed::Yes(Arc::new(LogicalPlan::Join {
                left: new_left,
                right: right.clone(),
                keys: keys.clone(),
                kind: *kind,
            })));
        }

        if vars.iter().all(|v| right_vars.contains(v)) {
            let new_right = Arc::new(LogicalPlan::Filter {
                child: right.clone(),
                predicate: predicate.clone(),
            });
            return Ok(Transformed::Yes(Arc::new(LogicalPlan::Join {
                left: left.clone(),
                right: new_right,
                keys: keys.clone(),
                kind: *kind,
            })));
        }

        Ok(Transformed::No(node.clone()))
    }
}
