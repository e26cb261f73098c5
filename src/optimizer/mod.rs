//! Component E: the cost-based optimizer.
//!
//! A bounded fixed-point rule engine over the plan tree (spec.md
//! §4.E): each enabled rule is tried against every node, post-order,
//! until a full iteration makes no change or `max_iterations` is hit.
//! `Transformed<T>` and the `OptimizerPass` trait mirror the teacher's
//! own optimizer driver (`query_planner/optimizer/{optimizer_pass,
//! mod}.rs`); `Pass`/`OptimizerError` mirror its error taxonomy
//! (`brahmand/src/query_planner/optimizer/errors.rs`). Unlike the
//! teacher - whose `LogicalPlan` gives every node its own struct and
//! thus its own `rebuild_or_clone` method - this crate's plan algebra
//! is one flat enum, so [`bottom_up`] generalizes that idiom into a
//! single recursive driver instead of one hand-written traversal per
//! rule.

pub mod cost;
pub mod errors;
pub mod filter_pushdown;
pub mod index_hint;
pub mod join_reorder;
pub mod predicate_pushdown;
pub mod time_range_injection;

pub use errors::{OptimizerError, Pass};

use crate::config::OptimizerConfig;
use crate::diagnostics::Diagnostic;
use crate::plan::{LogicalPlan, PlanRef};
use crate::schema::SchemaMap;
use std::sync::Arc;

pub type OptimizerResult<T> = Result<T, OptimizerError>;

/// Whether a rewrite changed the plan, carrying the (possibly
/// unchanged) result either way so callers never have to branch on
/// which variant before unwrapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed<T> {
    Yes(T),
    No(T),
}

impl<T> Transformed<T> {
    pub fn get_plan(self) -> T {
        match self {
            Transformed::Yes(plan) | Transformed::No(plan) => plan,
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Transformed::Yes(_))
    }
}

/// One rule application recorded in the optimizer log returned
/// alongside the rewritten plan, per spec.md §4.E.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleApplication {
    pub rule: String,
    pub description: String,
    pub estimated_time_ms_delta: f64,
}

pub trait OptimizerPass {
    fn pass(&self) -> Pass;

    /// Try to rewrite a single node, *ignoring its children* (already
    /// optimized by the time this is called - see [`bottom_up`]).
    /// `Err` means the rule could not prove its candidate rewrite
    /// preserves semantics and must refuse; the driver isolates this
    /// per spec.md's rule-failure-isolation note rather than aborting
    /// the whole optimization.
    fn try_rewrite<'a>(
        &self,
        node: &PlanRef<'a>,
        schema: &SchemaMap,
    ) -> OptimizerResult<Transformed<PlanRef<'a>>>;

    fn optimize<'a>(
        &self,
        plan: &PlanRef<'a>,
        schema: &SchemaMap,
    ) -> OptimizerResult<Transformed<PlanRef<'a>>> {
        bottom_up(plan, &mut |node| self.try_rewrite(node, schema))
    }
}

/// Rebuild `plan` with `new_children` swapped in for its own children,
/// in the order `LogicalPlan::children()` enumerates them. Panics only
/// on an internal inconsistency (wrong arity), never on caller input -
/// every call site passes a `new_children` it built from this same
/// node's own `children()`.
fn with_children<'a>(plan: &LogicalPlan<'a>, mut new_children: Vec<PlanRef<'a>>) -> LogicalPlan<'a> {
    match plan {
        LogicalPlan::Scan { .. }
        | LogicalPlan::GraphMatch { .. }
        | LogicalPlan::ShortestPaths { .. }
        | LogicalPlan::AllPaths { .. } => plan.clone(),
        LogicalPlan::Filter { predicate, .. } => LogicalPlan::Filter {
            child: new_children.remove(0),
            predicate: predicate.clone(),
        },
        LogicalPlan::Unwind { expr, alias, .. } => LogicalPlan::Unwind {
            child: new_children.remove(0),
            expr: expr.clone(),
            alias,
        },
        LogicalPlan::Project { items, distinct, .. } => LogicalPlan::Project {
            child: new_children.remove(0),
            items: items.clone(),
            distinct: *distinct,
        },
        LogicalPlan::Aggregate { group_keys, aggs, .. } => LogicalPlan::Aggregate {
            child: new_children.remove(0),
            group_keys: group_keys.clone(),
            aggs: aggs.clone(),
        },
        LogicalPlan::Sort { keys, .. } => LogicalPlan::Sort {
            child: new_children.remove(0),
            keys: keys.clone(),
        },
        LogicalPlan::Limit { n, skip, .. } => LogicalPlan::Limit {
            child: new_children.remove(0),
            n: *n,
            skip: *skip,
        },
        LogicalPlan::Join { keys, kind, .. } => LogicalPlan::Join {
            left: new_children.remove(0),
            right: new_children.remove(0),
            keys: keys.clone(),
            kind: *kind,
        },
    }
}

/// Apply `rewrite` to every node of `plan`, children first, rebuilding
/// only the spine above any subtree that actually changed (untouched
/// subtrees are `Arc`-shared, never cloned, per the plan module's own
/// design note on `Arc<LogicalPlan>`).
pub(crate) fn bottom_up<'a>(
    plan: &PlanRef<'a>,
    rewrite: &mut dyn FnMut(&PlanRef<'a>) -> OptimizerResult<Transformed<PlanRef<'a>>>,
) -> OptimizerResult<Transformed<PlanRef<'a>>> {
    let original_children = plan.children();
    let mut new_children = Vec::with_capacity(original_children.len());
    let mut any_child_changed = false;
    for child in &original_children {
        let child_tf = bottom_up(child, rewrite)?;
        any_child_changed |= child_tf.is_yes();
        new_children.push(child_tf.get_plan());
    }

    let rebuilt: PlanRef<'a> = if any_child_changed {
        Arc::new(with_children(plan.as_ref(), new_children))
    } else {
        plan.clone()
    };

    match rewrite(&rebuilt)? {
        Transformed::Yes(p) => Ok(Transformed::Yes(p)),
        Transformed::No(p) => {
            if any_child_changed {
                Ok(Transformed::Yes(p))
            } else {
                Ok(Transformed::No(p))
            }
        }
    }
}

/// Run the full, bounded fixed-point optimization pass over `plan`.
/// Returns the rewritten plan, the rule-application log (spec.md
/// §4.E), and any diagnostics produced by rules that refused to apply
/// (isolated failures, never fatal - see spec.md's error-handling
/// design note on optimizer rule isolation).
pub fn optimize<'a>(
    plan: PlanRef<'a>,
    schema: &SchemaMap,
    config: &OptimizerConfig,
) -> (PlanRef<'a>, Vec<RuleApplication>, Vec<Diagnostic>) {
    let mut passes: Vec<Box<dyn OptimizerPass>> = Vec::new();
    if config.enable_filter_pushdown {
        passes.push(Box::new(filter_pushdown::FilterPushdown));
    }
    if config.enable_predicate_pushdown {
        passes.push(Box::new(predicate_pushdown::PredicatePushdown));
    }
    if config.enable_time_range {
        passes.push(Box::new(time_range_injection::TimeRangeInjection));
    }
    if config.enable_join_reorder {
        passes.push(Box::new(join_reorder::JoinReorder));
    }
    if config.enable_index_hints {
        passes.push(Box::new(index_hint::IndexHint));
    }

    let mut plan = plan;
    let mut log = Vec::new();
    let mut diagnostics = Vec::new();

    for _ in 0..config.max_iterations {
        let mut changed = false;
        for pass in &passes {
            match pass.optimize(&plan, schema) {
                Ok(Transformed::Yes(new_plan)) => {
                    let before = cost::estimate(&plan);
                    let after = cost::estimate(&new_plan);
                    log.push(RuleApplication {
                        rule: pass.pass().to_string(),
                        description: format!(
                            "{} rewrote the plan (estimated rows {:.0} -> {:.0})",
                            pass.pass(),
                            before.rows,
                            after.rows
                        ),
                        estimated_time_ms_delta: before.time_ms - after.time_ms,
                    });
                    plan = new_plan;
                    changed = true;
                }
                Ok(Transformed::No(_)) => {}
                Err(err) => {
                    diagnostics.push(Diagnostic::warning(
                        "optimizer-rule-skipped",
                        format!("{} was skipped: {err}", pass.pass()),
                    ));
                }
            }
        }
        if !changed {
            break;
        }
    }

    (plan, log, diagnostics)
}
