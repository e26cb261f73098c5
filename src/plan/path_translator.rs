//! Component H: lowers `shortestPath(...)`, `allShortestPaths(...)`,
//! and `allPaths(...)` into the dedicated `ShortestPaths`/`AllPaths`
//! plan nodes, instead of leaving them as a `GraphMatch` the emitter
//! would have no principled way to turn into
//! `graph-shortest-paths`/`all_shortest_paths`/`all_paths`. A bare
//! (un-wrapped) variable-length relationship stays a `Chain` and lowers
//! through the ordinary `graph-match` path instead (spec.md §4.D rule
//! 1, and the literal scenario 2 end-to-end example).
//!
//! Both forms still produce a plan node that slots into the same tree
//! `builder::place_where`/`join_clauses` walk, so the optimizer's rule
//! passes (`FilterPushdown`, `TimeRangeInjection`, ...) need no special
//! case for path queries.

use super::builder::property_kv_to_expr;
use super::errors::PlanError;
use super::{
    EdgeTableRef, GraphDef, LogicalPlan, NodeTableRef, PlanNodePattern, PlanRef,
};
use crate::parser::ast::{Direction, PatternElement, PatternPath};
use crate::schema::SchemaMap;
use std::sync::Arc;

/// Lower `shortestPath((a)-[:R*..n]-(b))` / `allShortestPaths(...)` into
/// a `ShortestPaths` node. `find_all` selects which of the two Cypher
/// forms this is, per the doc comment on `LogicalPlan::ShortestPaths`.
pub fn lower_shortest_path<'a>(
    inner: &PatternPath<'a>,
    find_all: bool,
    schema: &SchemaMap,
) -> Result<PlanRef<'a>, PlanError> {
    let elements = inner.elements();
    let (src_pattern, rel, dst_pattern) = extract_single_hop(elements)?;

    let rel_type = rel.types.first().map(|s| s.to_string());
    let mut graph_def = GraphDef::default();
    let mut weight_column = None;

    let src = lower_endpoint(src_pattern, schema, &mut graph_def)?;
    let dst = lower_endpoint(dst_pattern, schema, &mut graph_def)?;

    if let Some(rt) = &rel_type {
        let binding = schema.resolve_rel(rt)?;
        weight_column = binding.weight_property.clone();
        graph_def.edges.push(EdgeTableRef {
            rel_type: rt.clone(),
            table: binding.table.clone(),
            source_column: binding.source.clone(),
            target_column: binding.target.clone(),
            weight_column: weight_column.clone(),
        });
    }

    let max_len = match rel.length.max_hops() {
        Some(0) | None if !rel.length.is_variable() => Some(1),
        Some(n) => Some(n),
        None => None,
    };

    let bidirectional = matches!(rel.direction, Direction::Either);

    let path_var = match inner {
        PatternPath::Chain { path_var, .. } => *path_var,
        _ => None,
    };

    Ok(Arc::new(LogicalPlan::ShortestPaths {
        graph_def,
        path_var,
        src,
        dst,
        rel_type,
        weight_column,
        max_len,
        bidirectional,
        find_all,
        residual_filter: None,
        time_filters: Vec::new(),
    }))
}

/// Lower an `allPaths(...)`-wrapped two-node variable-length pattern,
/// `allPaths((a)-[:R*min..max]-(b))`, into an `AllPaths` node: spec.md
/// §4.H treats it as "every path up to the bound", the same semantics
/// `all_shortest_paths` does *not* have (that operator only ever
/// returns shortest paths) - so this routes to `AllPaths`, not
/// `ShortestPaths`.
pub fn lower_all_paths<'a>(path: &PatternPath<'a>, schema: &SchemaMap) -> Result<PlanRef<'a>, PlanError> {
    let elements = path.elements();
    let (src_pattern, rel, dst_pattern) = extract_single_hop(elements)?;

    let min_len = rel.length.min_hops();
    let max_len = rel.length.max_hops().ok_or(PlanError::NonPositiveMaxLength)?;
    if min_len > max_len {
        return Err(PlanError::PatternMalformed {
            min: min_len,
            max: max_len,
        });
    }
    if max_len == 0 {
        return Err(PlanError::NonPositiveMaxLength);
    }

    let rel_type = rel.types.first().map(|s| s.to_string());
    let mut graph_def = GraphDef::default();

    let src = lower_endpoint(src_pattern, schema, &mut graph_def)?;
    let dst = lower_endpoint(dst_pattern, schema, &mut graph_def)?;

    if let Some(rt) = &rel_type {
        let binding = schema.resolve_rel(rt)?;
        graph_def.edges.push(EdgeTableRef {
            rel_type: rt.clone(),
            table: binding.table.clone(),
            source_column: binding.source.clone(),
            target_column: binding.target.clone(),
            weight_column: binding.weight_property.clone(),
        });
    }

    let path_var = match path {
        PatternPath::Chain { path_var, .. } => *path_var,
        _ => None,
    };

    Ok(Arc::new(LogicalPlan::AllPaths {
        graph_def,
        path_var,
        src,
        dst,
        rel_type,
        min_len,
        max_len,
        // No Cypher-level surface names this yet (see the Open
        // Questions note in the grounding ledger); every AllPaths
        // search assumes a non-cyclic graph traversal the way KQL's
        // `graph-match` with a bounded hop count naturally does.
        cycle_detect: true,
        time_filters: Vec::new(),
        residual_filter: None,
    }))
}

fn extract_single_hop<'a, 'b>(
    elements: &'b [PatternElement<'a>],
) -> Result<
    (
        &'b crate::parser::ast::NodePattern<'a>,
        &'b crate::parser::ast::RelPattern<'a>,
        &'b crate::parser::ast::NodePattern<'a>,
    ),
    PlanError,
> {
    match elements {
        [PatternElement::Node(src), PatternElement::Rel(rel), PatternElement::Node(dst)] => {
            Ok((src, rel, dst))
        }
        _ => Err(PlanError::UnsupportedConstruct {
            construct:
                "shortestPath/allShortestPaths/variable-length patterns with more than one relationship hop"
                    .to_string(),
        }),
    }
}

fn lower_endpoint<'a>(
    node: &crate::parser::ast::NodePattern<'a>,
    schema: &SchemaMap,
    graph_def: &mut GraphDef,
) -> Result<PlanNodePattern<'a>, PlanError> {
    let label = node.labels.first().map(|s| s.to_string());
    if let Some(l) = &label {
        let binding = schema.resolve_label(l)?;
        graph_def.nodes.push(NodeTableRef {
            label: l.clone(),
            table: binding.table.clone(),
            key_column: binding.key.clone(),
        });
    }
    let mut filters = Vec::new();
    for kv in &node.properties {
        filters.push(property_kv_to_expr(node.var, kv)?);
    }
    Ok(PlanNodePattern {
        var: node.var.unwrap_or("_anon"),
        label,
        property_filters: filters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::schema::SchemaMap;

    fn sample_schema() -> SchemaMap {
        SchemaMap::from_yaml_str(
            r#"
node_mappings:
  User:
    table: Users
    key: userId
    properties: {}
relationship_mappings:
  REPORTS_TO:
    table: ReportsTo
    source: userId
    target: managerId
    properties: {}
    weight_property: null
"#,
        )
        .unwrap()
    }

    #[test]
    fn shortest_path_lowers_to_shortest_paths_node() {
        let schema = sample_schema();
        let stmt = parse(
            "MATCH p = shortestPath((a:User)-[:REPORTS_TO*..5]-(b:User)) RETURN p",
            64 * 1024,
            32,
        )
        .unwrap();
        let path = &stmt.query.reading_clauses[0].patterns[0];
        let plan = super::lower_shortest_path(
            match path {
                PatternPath::ShortestPath(inner) => inner,
                _ => panic!("expected ShortestPath"),
            },
            false,
            &schema,
        )
        .unwrap();
        match plan.as_ref() {
            LogicalPlan::ShortestPaths {
                find_all, max_len, ..
            } => {
                assert!(!find_all);
                assert_eq!(*max_len, Some(5));
            }
            other => panic!("expected ShortestPaths, got {other:?}"),
        }
    }

    #[test]
    fn all_shortest_paths_sets_find_all() {
        let schema = sample_schema();
        let stmt = parse(
            "MATCH p = allShortestPaths((a:User)-[:REPORTS_TO*1..5]-(b:User)) RETURN p",
            64 * 1024,
            32,
        )
        .unwrap();
        let path = &stmt.query.reading_clauses[0].patterns[0];
        let plan = super::lower_shortest_path(
            match path {
                PatternPath::AllShortestPaths(inner) => inner,
                _ => panic!("expected AllShortestPaths"),
            },
            true,
            &schema,
        )
        .unwrap();
        assert!(matches!(
            plan.as_ref(),
            LogicalPlan::ShortestPaths { find_all: true, .. }
        ));
    }

    #[test]
    fn unbounded_variable_length_rejects_all_paths() {
        let schema = sample_schema();
        let stmt = parse(
            "MATCH allPaths((a:User)-[:REPORTS_TO*]->(b:User)) RETURN b",
            64 * 1024,
            32,
        )
        .unwrap();
        let path = &stmt.query.reading_clauses[0].patterns[0];
        let inner = match path {
            PatternPath::AllPaths(inner) => inner,
            other => panic!("expected AllPaths, got {other:?}"),
        };
        let err = super::lower_all_paths(inner, &schema).unwrap_err();
        assert!(matches!(err, PlanError::NonPositiveMaxLength));
    }

    #[test]
    fn all_paths_wrapper_lowers_to_all_paths_node() {
        let schema = sample_schema();
        let stmt = parse(
            "MATCH allPaths((a:User)-[:REPORTS_TO*1..3]->(b:User)) RETURN b",
            64 * 1024,
            32,
        )
        .unwrap();
        let path = &stmt.query.reading_clauses[0].patterns[0];
        let inner = match path {
            PatternPath::AllPaths(inner) => inner,
            other => panic!("expected AllPaths, got {other:?}"),
        };
        let plan = super::lower_all_paths(inner, &schema).unwrap();
        match plan.as_ref() {
            LogicalPlan::AllPaths { min_len, max_len, .. } => {
                assert_eq!(*min_len, 1);
                assert_eq!(*max_len, 3);
            }
            other => panic!("expected AllPaths, got {other:?}"),
        }
    }
}
