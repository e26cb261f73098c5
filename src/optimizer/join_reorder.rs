//! `JoinReorder`: for a commutative inner join, put the more selective
//! (lower estimated row count) side on the left (spec.md §4.E). Left
//! position matters downstream: the emitter's `join kind=inner`
//! rendering and the cost model's `max_card(key)` term both read more
//! naturally with the smaller side first, mirroring a conventional
//! left-deep join-order heuristic.

use super::cost;
use super::errors::Pass;
use super::{OptimizerPass, OptimizerResult, Transformed};
use crate::plan::{JoinKind, LogicalPlan, PlanRef};
use crate::schema::SchemaMap;
use std::sync::Arc;

pub struct JoinReorder;

impl OptimizerPass for JoinReorder {
    fn pass(&self) -> Pass {
        Pass::JoinReorder
    }

    fn try_rewrite<'a>(
        &self,
        node: &PlanRef<'a>,
        _schema: &SchemaMap,
    ) -> OptimizerResult<Transformed<PlanRef<'a>>> {
        let LogicalPlan::Join {
            left,
            right,
            keys,
            kind,
        } = node.as_ref()
        else {
            return Ok(Transformed::No(node.clone()));
        };

        // Only commutative (inner) joins are reordered; an outer
        // join's preserved side must stay where the caller put it.
        if !matches!(kind, JoinKind::Inner) {
            return Ok(Transformed::No(node.clone()));
        }

        let left_cost = cost::estimate(left);
        let right_cost = cost::estimate(right);

        if right_cost.rows < left_cost.rows {
            let swapped_keys = keys.iter().map(|(l, r)| (r.clone(), l.clone())).collect();
            return Ok(Transformed::Yes(Arc::new(LogicalPlan::Join {
                left: right.clone(),
                right: left.clone(),
                keys: swapped_keys,
                kind: *kind,
            })));
        }

        Ok(Transformed::No(node.clone()))
    }
}
