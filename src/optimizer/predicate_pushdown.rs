//! `PredicatePushdown`: absorb a single-variable equality/`IN` `Filter`
//! directly into the `NodePattern`/`RelPattern` of the `GraphMatch`/
//! `ShortestPaths`/`AllPaths` it sits over (spec.md §4.E).
//!
//! The plan builder (`plan::builder::place_where`) already performs
//! this absorption for predicates introduced by the same `MATCH`/
//! `WHERE` they came from; this rule exists for predicates that only
//! become eligible *after* `FilterPushdown` has moved a `Filter` down
//! next to its pattern (e.g. a `WITH`-chain `WHERE` that `FilterPushdown`
//! pushes across a `Join`). Because each `Filter` node here holds
//! exactly one conjunct (the builder splits `AND` before wrapping), a
//! successful absorption always removes the `Filter` node entirely
//! rather than partially rewriting its predicate.

use super::errors::Pass;
use super::{OptimizerPass, OptimizerResult, Transformed};
use crate::parser::ast::{BinOp, Expr};
use crate::plan::{LogicalPlan, PlanPatternElement, PlanRef};
use crate::schema::SchemaMap;
use std::sync::Arc;

pub struct PredicatePushdown;

impl OptimizerPass for PredicatePushdown {
    fn pass(&self) -> Pass {
        Pass::PredicatePushdown
    }

    fn try_rewrite<'a>(
        &self,
        node: &PlanRef<'a>,
        _schema: &SchemaMap,
    ) -> OptimizerResult<Transformed<PlanRef<'a>>> {
        let LogicalPlan::Filter { child, predicate } = node.as_ref() else {
            return Ok(Transformed::No(node.clone()));
        };

        if !is_absorbable(predicate) {
            return Ok(Transformed::No(node.clone()));
        }
        let vars = predicate.free_variables();
        if vars.len() != 1 {
            return Ok(Transformed::No(node.clone()));
        }
        let var = vars[0];

        match child.as_ref() {
            LogicalPlan::GraphMatch {
                graph_def,
                elements,
                residual_filter,
                kind,
                time_filters,
                hints,
            } => {
                let Some(idx) = elements.iter().position(|e| e.variable() == Some(var)) else {
                    return Ok(Transformed::No(node.clone()));
                };
                let mut new_elements = elements.clone();
                match &mut new_elements[idx] {
                    PlanPatternElement::Node(n) => n.property_filters.push(predicate.clone()),
                    PlanPatternElement::Rel(r) => r.property_filters.push(predicate.clone()),
                }
                Ok(Transformed::Yes(Arc::new(LogicalPlan::GraphMatch {
                    graph_def: graph_def.clone(),
                    elements: new_elements,
                    residual_filter: residual_filter.clone(),
                    kind: *kind,
                    time_filters: time_filters.clone(),
                    hints: hints.clone(),
                })))
            }
            LogicalPlan::ShortestPaths {
                graph_def,
                path_var,
                src,
                dst,
                rel_type,
                weight_column,
                max_len,
                bidirectional,
                find_all,
                residual_filter,
                time_filters,
            } => {
                let (new_src, new_dst) = match absorb_into_endpoint(src, dst, var, predicate) {
                    Some(pair) => pair,
                    None => return Ok(Transformed::No(node.clone())),
                };
                Ok(Transformed::Yes(Arc::new(LogicalPlan::ShortestPaths {
                    graph_def: graph_def.clone(),
                    path_var: *path_var,
                    src: new_src,
                    dst: new_dst,
                    rel_type: rel_type.clone(),
                    weight_column: weight_column.clone(),
                    max_len: *max_len,
                    bidirectional: *bidirectional,
                    find_all: *find_all,
                    residual_filter: residual_filter.clone(),
                    time_filters: time_filters.clone(),
                })))
            }
            LogicalPlan::AllPaths {
                graph_def,
                path_var,
                src,
                dst,
                rel_type,
                min_len,
                max_len,
                cycle_detect,
                time_filters,
                residual_filter,
            } => {
                let (new_src, new_dst) = match absorb_into_endpoint(src, dst, var, predicate) {
                    Some(pair) => pair,
                    None => return Ok(Transformed::No(node.clone())),
                };
                Ok(Transformed::Yes(Arc::new(LogicalPlan::AllPaths {
                    graph_def: graph_def.clone(),
                    path_var: *path_var,
                    src: new_src,
                    dst: new_dst,
                    rel_type: rel_type.clone(),
                    min_len: *min_len,
                    max_len: *max_len,
                    cycle_detect: *cycle_detect,
                    time_filters: time_filters.clone(),
                    residual_filter: residual_filter.clone(),
                })))
            }
            _ => Ok(Transformed::No(node.clone())),
        }
    }
}

fn absorb_into_endpoint<'a>(
    src: &crate::plan::PlanNodePattern<'a>,
    dst: &crate::plan::PlanNodePattern<'a>,
    var: &'a str,
    predicate: &Expr<'a>,
) -> Option<(crate::plan::PlanNodePattern<'a>, crate::plan::PlanNodePattern<'a>)> {
    if src.var == var {
        let mut new_src = src.clone();
        new_src.property_filters.push(predicate.clone());
        return Some((new_src, dst.clone()));
    }
    if dst.var == var {
        let mut new_dst = dst.clone();
        new_dst.property_filters.push(predicate.clone());
        return Some((src.clone(), new_dst));
    }
    None
}

/// The guard from spec.md's rule table: `=` or `IN` against a literal
/// or a parameter.
fn is_absorbable(expr: &Expr<'_>) -> bool {
    match expr {
        Expr::Binary {
            op: BinOp::Eq | BinOp::In,
            rhs,
            ..
        } => matches!(rhs.as_ref(), Expr::Literal(_) | Expr::Parameter(_) | Expr::List(_)),
        _ => false,
    }
}
