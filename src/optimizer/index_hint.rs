//! `IndexHint`: annotate a `GraphMatch` with an advisory hint when a
//! property used in an equality comparison is marked indexed in the
//! schema (spec.md §4.E). Purely informational - the emitter renders
//! it as a comment, never a semantic change - so this rule only ever
//! adds annotations and never needs to refuse for equivalence reasons.
//!
//! Scoped to `GraphMatch` only: `ShortestPaths`/`AllPaths` have no
//! `hints` field (path queries have no direct analogue to a `Scan`
//! hint in the same way a multi-element pattern match does), a scoping
//! decision recorded in the grounding ledger.

use super::errors::Pass;
use super::{OptimizerPass, OptimizerResult, Transformed};
use crate::parser::ast::{BinOp, Expr};
use crate::plan::{IndexHintAnnotation, LogicalPlan, PlanPatternElement, PlanRef};
use crate::schema::SchemaMap;
use std::sync::Arc;

pub struct IndexHint;

impl OptimizerPass for IndexHint {
    fn pass(&self) -> Pass {
        Pass::IndexHint
    }

    fn try_rewrite<'a>(
        &self,
        node: &PlanRef<'a>,
        schema: &SchemaMap,
    ) -> OptimizerResult<Transformed<PlanRef<'a>>> {
        let LogicalPlan::GraphMatch {
            graph_def,
            elements,
            residual_filter,
            kind,
            time_filters,
            hints,
        } = node.as_ref()
        else {
            return Ok(Transformed::No(node.clone()));
        };

        let mut additions = Vec::new();
        for element in elements {
            match element {
                PlanPatternElement::Node(n) => {
                    let Some(label) = &n.label else { continue };
                    for filter in &n.property_filters {
                        if let Some(prop) = equality_property(filter) {
                            if schema.is_node_property_indexed(label, prop) {
                                let Ok(binding) = schema.resolve_label(label) else {
                                    continue;
                                };
                                if let Some(column) = binding.properties.get(prop) {
                                    let candidate = IndexHintAnnotation {
                                        variable: n.var.to_string(),
                                        property: prop.to_string(),
                                        column: column.clone(),
                                    };
                                    if !hints.contains(&candidate) && !additions.contains(&candidate) {
                                        additions.push(candidate);
                                    }
                                }
                            }
                        }
                    }
                }
                PlanPatternElement::Rel(r) => {
                    let Some(rel_type) = &r.rel_type else { continue };
                    let Some(var) = r.var else { continue };
                    for filter in &r.property_filters {
                        if let Some(prop) = equality_property(filter) {
                            if schema.is_rel_property_indexed(rel_type, prop) {
                                let Ok(binding) = schema.resolve_rel(rel_type) else {
                                    continue;
                                };
                                if let Some(column) = binding.properties.get(prop) {
                                    let candidate = IndexHintAnnotation {
                                        variable: var.to_string(),
                                        property: prop.to_string(),
                                        column: column.clone(),
                                    };
                                    if !hints.contains(&candidate) && !additions.contains(&candidate) {
                                        additions.push(candidate);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        if additions.is_empty() {
            return Ok(Transformed::No(node.clone()));
        }

        let mut new_hints = hints.clone();
        new_hints.extend(additions);
        Ok(Transformed::Yes(Arc::new(LogicalPlan::GraphMatch {
            graph_def: graph_def.clone(),
            elements: elements.clone(),
            residual_filter: residual_filter.clone(),
            kind: *kind,
            time_filters: time_filters.clone(),
            hints: new_hints,
        })))
    }
}

fn equality_property<'a>(expr: &Expr<'a>) -> Option<&'a str> {
    match expr {
        Expr::Binary {
            op: BinOp::Eq,
            lhs,
            ..
        } => match lhs.as_ref() {
            Expr::Property { key, .. } => Some(*key),
            _ => None,
        },
        _ => None,
    }
}
