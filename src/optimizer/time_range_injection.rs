//! `TimeRangeInjection`: add a `<time_column> >= ago(<window>)` bound
//! to every `GraphMatch`/`ShortestPaths`/`AllPaths` source the schema
//! declares a time column for, when the query has no explicit filter
//! on that column already (spec.md §4.E). Sentinel tables are typically
//! unbounded time series; an unbounded `make-graph` source is the
//! single most expensive mistake this crate can let through silently,
//! so this rule (unlike the others) defaults to *adding* work rather
//! than removing it when the cost model says it should.

use super::errors::Pass;
use super::{OptimizerPass, OptimizerResult, Transformed};
use crate::plan::{GraphDef, LogicalPlan, PlanNodePattern, PlanPatternElement, PlanRef, TimeRangeFilter};
use crate::schema::SchemaMap;
use std::sync::Arc;

pub struct TimeRangeInjection;

impl OptimizerPass for TimeRangeInjection {
    fn pass(&self) -> Pass {
        Pass::TimeRangeInjection
    }

    fn try_rewrite<'a>(
        &self,
        node: &PlanRef<'a>,
        schema: &SchemaMap,
    ) -> OptimizerResult<Transformed<PlanRef<'a>>> {
        let Some(window) = schema.options.default_time_window.as_deref() else {
            return Ok(Transformed::No(node.clone()));
        };

        match node.as_ref() {
            LogicalPlan::GraphMatch {
                graph_def,
                elements,
                residual_filter,
                kind,
                time_filters,
                hints,
            } => {
                let additions = missing_time_filters(graph_def, elements, time_filters, schema, window);
                if additions.is_empty() {
                    return Ok(Transformed::No(node.clone()));
                }
                let mut new_filters = time_filters.clone();
                new_filters.extend(additions);
                Ok(Transformed::Yes(Arc::new(LogicalPlan::GraphMatch {
                    graph_def: graph_def.clone(),
                    elements: elements.clone(),
                    residual_filter: residual_filter.clone(),
                    kind: *kind,
                    time_filters: new_filters,
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
                let additions =
                    missing_time_filters_for_endpoints(graph_def, src, dst, time_filters, schema, window);
                if additions.is_empty() {
                    return Ok(Transformed::No(node.clone()));
                }
                let mut new_filters = time_filters.clone();
                new_filters.extend(additions);
                Ok(Transformed::Yes(Arc::new(LogicalPlan::ShortestPaths {
                    graph_def: graph_def.clone(),
                    path_var: *path_var,
                    src: src.clone(),
                    dst: dst.clone(),
                    rel_type: rel_type.clone(),
                    weight_column: weight_column.clone(),
                    max_len: *max_len,
                    bidirectional: *bidirectional,
                    find_all: *find_all,
                    residual_filter: residual_filter.clone(),
                    time_filters: new_filters,
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
                let additions =
                    missing_time_filters_for_endpoints(graph_def, src, dst, time_filters, schema, window);
                if additions.is_empty() {
                    return Ok(Transformed::No(node.clone()));
                }
                let mut new_filters = time_filters.clone();
                new_filters.extend(additions);
                Ok(Transformed::Yes(Arc::new(LogicalPlan::AllPaths {
                    graph_def: graph_def.clone(),
                    path_var: *path_var,
                    src: src.clone(),
                    dst: dst.clone(),
                    rel_type: rel_type.clone(),
                    min_len: *min_len,
                    max_len: *max_len,
                    cycle_detect: *cycle_detect,
                    time_filters: new_filters,
                    residual_filter: residual_filter.clone(),
                })))
            }
            _ => Ok(Transformed::No(node.clone())),
        }
    }
}

fn missing_time_filters(
    graph_def: &GraphDef,
    elements: &[PlanPatternElement<'_>],
    existing: &[TimeRangeFilter],
    schema: &SchemaMap,
    window: &str,
) -> Vec<TimeRangeFilter> {
    let mut out = Vec::new();
    for node_table in &graph_def.nodes {
        let Ok(binding) = schema.resolve_label(&node_table.label) else {
            continue;
        };
        let Some(time_column) = &binding.time_column else {
            continue;
        };
        if existing.iter().any(|f| f.table == node_table.table) {
            continue;
        }
        if has_explicit_filter(elements, &node_table.label, None, &binding.properties, time_column) {
            continue;
        }
        out.push(TimeRangeFilter {
            table: node_table.table.clone(),
            column: time_column.clone(),
            window: window.to_string(),
        });
    }
    for edge_table in &graph_def.edges {
        let Ok(binding) = schema.resolve_rel(&edge_table.rel_type) else {
            continue;
        };
        let Some(time_column) = &binding.time_column else {
            continue;
        };
        if existing.iter().any(|f| f.table == edge_table.table) {
            continue;
        }
        if has_explicit_filter(elements, "", Some(&edge_table.rel_type), &binding.properties, time_column) {
            continue;
        }
        out.push(TimeRangeFilter {
            table: edge_table.table.clone(),
            column: time_column.clone(),
            window: window.to_string(),
        });
    }
    out
}

fn missing_time_filters_for_endpoints(
    graph_def: &GraphDef,
    src: &PlanNodePattern<'_>,
    dst: &PlanNodePattern<'_>,
    existing: &[TimeRangeFilter],
    schema: &SchemaMap,
    window: &str,
) -> Vec<TimeRangeFilter> {
    let mut out = Vec::new();
    for node_table in &graph_def.nodes {
        let Ok(binding) = schema.resolve_label(&node_table.label) else {
            continue;
        };
        let Some(time_column) = &binding.time_column else {
            continue;
        };
        if existing.iter().any(|f| f.table == node_table.table) {
            continue;
        }
        let endpoint = if src.label.as_deref() == Some(node_table.label.as_str()) {
            Some(src)
        } else if dst.label.as_deref() == Some(node_table.label.as_str()) {
            Some(dst)
        } else {
            None
        };
        if let Some(endpoint) = endpoint {
            if property_name_for_column(&binding.properties, time_column)
                .map(|prop| endpoint.property_filters.iter().any(|f| expr_mentions_property(f, prop)))
                .unwrap_or(false)
            {
                continue;
            }
        }
        out.push(TimeRangeFilter {
            table: node_table.table.clone(),
            column: time_column.clone(),
            window: window.to_string(),
        });
    }
    for edge_table in &graph_def.edges {
        let Ok(binding) = schema.resolve_rel(&edge_table.rel_type) else {
            continue;
        };
        let Some(time_column) = &binding.time_column else {
            continue;
        };
        if existing.iter().any(|f| f.table == edge_table.table) {
            continue;
        }
        out.push(TimeRangeFilter {
            table: edge_table.table.clone(),
            column: time_column.clone(),
            window: window.to_string(),
        });
    }
    out
}

fn has_explicit_filter(
    elements: &[PlanPatternElement<'_>],
    label: &str,
    rel_type: Option<&str>,
    properties: &std::collections::HashMap<String, String>,
    time_column: &str,
) -> bool {
    let Some(prop) = property_name_for_column(properties, time_column) else {
        return false;
    };
    elements.iter().any(|e| match e {
        PlanPatternElement::Node(n) => {
            n.label.as_deref() == Some(label)
                && n.property_filters.iter().any(|f| expr_mentions_property(f, prop))
        }
        PlanPatternElement::Rel(r) => {
            rel_type.is_some()
                && r.rel_type.as_deref() == rel_type
                && r.property_filters.iter().any(|f| expr_mentions_property(f, prop))
        }
    })
}

fn property_name_for_column<'a>(
    properties: &'a std::collections::HashMap<String, String>,
    column: &str,
) -> Option<&'a str> {
    properties
        .iter()
        .find(|(_, col)| col.as_str() == column)
        .map(|(prop, _)| prop.as_str())
}

fn expr_mentions_property(expr: &crate::parser::ast::Expr<'_>, prop: &str) -> bool {
    use crate::parser::ast::Expr;
    match expr {
        Expr::Property { key, .. } => *key == prop,
        Expr::Binary { lhs, rhs, .. } => expr_mentions_property(lhs, prop) || expr_mentions_property(rhs, prop),
        Expr::Unary { expr, .. } => expr_mentions_property(expr, prop),
        _ => false,
    }
}
