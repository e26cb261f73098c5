//! Collects every Cypher `$parameter` referenced anywhere in a plan
//! tree, so [`super::emit`] can declare each as a KQL `let` binding at
//! the top of the output (spec.md §4.F: "parameters from the source
//! query become KQL `let` bindings at the top of the output"). A
//! translation never sees parameter *values* - only their names - so
//! the binding declares the identifier for the caller to supply, the
//! same shape the teacher's own ClickHouse emitter uses for session
//! variables it cannot resolve at compile time.

use crate::parser::ast::Expr;
use crate::plan::{LogicalPlan, PlanPatternElement, PlanRef};

pub fn collect<'a>(plan: &PlanRef<'a>) -> Vec<&'a str> {
    let mut out = Vec::new();
    walk(plan, &mut out);
    out.sort_unstable();
    out.dedup();
    out
}

fn walk<'a>(plan: &PlanRef<'a>, out: &mut Vec<&'a str>) {
    match plan.as_ref() {
        LogicalPlan::Scan { filter, .. } => {
            if let Some(f) = filter {
                from_expr(f, out);
            }
        }
        LogicalPlan::Filter { predicate, .. } => from_expr(predicate, out),
        LogicalPlan::GraphMatch {
            elements,
            residual_filter,
            ..
        } => {
            for element in elements {
                let filters = match element {
                    PlanPatternElement::Node(n) => &n.property_filters,
                    PlanPatternElement::Rel(r) => &r.property_filters,
                };
                for f in filters {
                    from_expr(f, out);
                }
            }
            if let Some(rf) = residual_filter {
                from_expr(rf, out);
            }
        }
        LogicalPlan::ShortestPaths {
            src,
            dst,
            residual_filter,
            ..
        }
        | LogicalPlan::AllPaths {
            src,
            dst,
            residual_filter,
            ..
        } => {
            for f in src.property_filters.iter().chain(&dst.property_filters) {
                from_expr(f, out);
            }
            if let Some(rf) = residual_filter {
                from_expr(rf, out);
            }
        }
        LogicalPlan::Unwind { expr, .. } => from_expr(expr, out),
        LogicalPlan::Project { items, .. } => {
            for i in items {
                from_expr(&i.expr, out);
            }
        }
        LogicalPlan::Aggregate { group_keys, aggs, .. } => {
            for i in group_keys.iter().chain(aggs) {
                from_expr(&i.expr, out);
            }
        }
        LogicalPlan::Sort { keys, .. } => {
            for (e, _) in keys {
                from_expr(e, out);
            }
        }
        LogicalPlan::Limit { .. } | LogicalPlan::Join { .. } => {}
    }
    for child in plan.children() {
        walk(child, out);
    }
}

fn from_expr<'a>(expr: &Expr<'a>, out: &mut Vec<&'a str>) {
    match expr {
        Expr::Parameter(name) => out.push(name),
        Expr::Property { base, .. } => from_expr(base, out),
        Expr::Binary { lhs, rhs, .. } => {
            from_expr(lhs, out);
            from_expr(rhs, out);
        }
        Expr::Unary { expr, .. } => from_expr(expr, out),
        Expr::FunctionCall { args, .. } => {
            for a in args {
                from_expr(a, out);
            }
        }
        Expr::List(items) => {
            for i in items {
                from_expr(i, out);
            }
        }
        Expr::Map(entries) => {
            for (_, v) in entries {
                from_expr(v, out);
            }
        }
        Expr::Literal(_) | Expr::Variable(_) => {}
    }
}
