//! Lowers a parsed `Query` into the plan algebra, in the three passes
//! spec.md §4.D names: pattern lowering, filter placement, result
//! shaping.
//!
//! `UNION`/`UNION ALL` of whole queries is deliberately *not* a plan
//! node here: spec.md's plan algebra (§3) enumerates a closed node set
//! that has no `Union` member, and the KQL `union` operator composes
//! naturally at the text level. `translate::translate` builds and
//! emits each union branch independently and joins the resulting KQL
//! text, rather than this module inventing an extra plan node spec.md
//! never asked for.

use super::errors::PlanError;
use super::path_translator;
use super::{
    EdgeTableRef, GraphDef, IndexHintAnnotation, JoinKind, LogicalPlan, NodeTableRef,
    PlanNodePattern, PlanPatternElement, PlanRef, PlanRelPattern, ProjectItem, MAX_PLAN_NODES,
};
use crate::config::Config;
use crate::parser::ast::{
    Expr, MatchClause, NodePattern, OrderByClause, PatternElement, PatternPath, ProjectionItem,
    Query, RelPattern,
};
use crate::schema::{PropertyResolution, SchemaError, SchemaMap};
use std::sync::Arc;

/// Lower a single query body into a plan tree. Statement-level `UNION`
/// branches are each lowered independently by the caller.
pub fn build_plan<'a>(
    query: &Query<'a>,
    schema: &SchemaMap,
    config: &Config,
) -> Result<PlanRef<'a>, PlanError> {
    let plan = build_query(query, schema, config)?;
    let nodes = plan.node_count();
    if nodes > MAX_PLAN_NODES {
        return Err(PlanError::TooManyNodes { max: MAX_PLAN_NODES });
    }
    Ok(plan)
}

fn build_query<'a>(
    query: &Query<'a>,
    schema: &SchemaMap,
    config: &Config,
) -> Result<PlanRef<'a>, PlanError> {
    let mut plan: Option<PlanRef<'a>> = None;

    for clause in &query.reading_clauses {
        let clause_plan = build_match_clause(clause, schema, config)?;
        plan = Some(match plan {
            None => clause_plan,
            Some(accumulated) => join_clauses(accumulated, clause_plan, clause.optional),
        });
    }

    let mut plan = plan.ok_or(PlanError::UnsupportedConstruct {
        construct: "a query with no MATCH/reading clause".to_string(),
    })?;

    if let Some(where_clause) = &query.where_clause {
        plan = place_where(plan, where_clause.expr.clone(), schema)?;
    }

    for unwind in &query.unwind_clauses {
        plan = Arc::new(LogicalPlan::Unwind {
            child: plan,
            expr: unwind.expr.clone(),
            alias: unwind.alias,
        });
    }

    if let Some(with) = &query.with_clause {
        let shaped = apply_projection(
            plan,
            &with.items,
            with.distinct,
            with.order_by.as_ref(),
            with.skip,
            with.limit,
        );
        let shaped = match &with.where_clause {
            Some(w) => place_where(shaped, w.expr.clone(), schema)?,
            None => shaped,
        };
        return build_with_continuation(shaped, &with.next, schema, config);
    }

    if let Some(ret) = &query.return_clause {
        plan = apply_projection(
            plan,
            &ret.items,
            ret.distinct,
            ret.order_by.as_ref(),
            ret.skip,
            ret.limit,
        );
    }

    Ok(plan)
}

/// `WITH`'s continuation (`next: Box<Query>`) is itself a full `Query`,
/// but one whose new reading clauses (if any) see the `WITH`'s
/// projected scope rather than starting over: we build whatever fresh
/// pattern/filter/unwind/with-or-return work the continuation adds and
/// join it against the already-shaped `with_plan` on shared variables,
/// the same way two sibling `MATCH` clauses join.
fn build_with_continuation<'a>(
    with_plan: PlanRef<'a>,
    continuation: &Query<'a>,
    schema: &SchemaMap,
    config: &Config,
) -> Result<PlanRef<'a>, PlanError> {
    let mut plan = with_plan;

    for clause in &continuation.reading_clauses {
        let clause_plan = build_match_clause(clause, schema, config)?;
        plan = join_clauses(plan, clause_plan, clause.optional);
    }

    if let Some(where_clause) = &continuation.where_clause {
        plan = place_where(plan, where_clause.expr.clone(), schema)?;
    }

    for unwind in &continuation.unwind_clauses {
        plan = Arc::new(LogicalPlan::Unwind {
            child: plan,
            expr: unwind.expr.clone(),
            alias: unwind.alias,
        });
    }

    if let Some(with) = &continuation.with_clause {
        let shaped = apply_projection(
            plan,
            &with.items,
            with.distinct,
            with.order_by.as_ref(),
            with.skip,
            with.limit,
        );
        let shaped = match &with.where_clause {
            Some(w) => place_where(shaped, w.expr.clone(), schema)?,
            None => shaped,
        };
        return build_with_continuation(shaped, &with.next, schema, config);
    }

    if let Some(ret) = &continuation.return_clause {
        plan = apply_projection(
            plan,
            &ret.items,
            ret.distinct,
            ret.order_by.as_ref(),
            ret.skip,
            ret.limit,
        );
    }

    Ok(plan)
}

/// Join two already-built clause plans on every variable both sides
/// already produce. `optional` selects `OPTIONAL MATCH`'s left-outer
/// semantics; an ordinary `MATCH` joins with inner semantics. With no
/// shared variable the join degrades to a cartesian product (`keys`
/// empty), which the emitter renders as an unconditional join.
fn join_clauses<'a>(left: PlanRef<'a>, right: PlanRef<'a>, optional: bool) -> PlanRef<'a> {
    let left_vars = left.output_variables();
    let keys: Vec<(String, String)> = right
        .output_variables()
        .into_iter()
        .filter(|v| left_vars.contains(v))
        .map(|v| (v.to_string(), v.to_string()))
        .collect();
    Arc::new(LogicalPlan::Join {
        left,
        right,
        keys,
        kind: if optional {
            JoinKind::LeftOuter
        } else {
            JoinKind::Inner
        },
    })
}

fn build_match_clause<'a>(
    clause: &MatchClause<'a>,
    schema: &SchemaMap,
    config: &Config,
) -> Result<PlanRef<'a>, PlanError> {
    let mut plan: Option<PlanRef<'a>> = None;
    for path in &clause.patterns {
        let path_plan = build_pattern_path(path, schema, config)?;
        plan = Some(match plan {
            None => path_plan,
            Some(accumulated) => join_clauses(accumulated, path_plan, false),
        });
    }
    let mut plan = plan.ok_or(PlanError::UnsupportedConstruct {
        construct: "MATCH with no patterns".to_string(),
    })?;
    if let Some(where_clause) = &clause.where_clause {
        plan = place_where(plan, where_clause.expr.clone(), schema)?;
    }
    Ok(plan)
}

fn build_pattern_path<'a>(
    path: &PatternPath<'a>,
    schema: &SchemaMap,
    config: &Config,
) -> Result<PlanRef<'a>, PlanError> {
    match path {
        PatternPath::ShortestPath(inner) => {
            path_translator::lower_shortest_path(inner, false, schema)
        }
        PatternPath::AllShortestPaths(inner) => {
            path_translator::lower_shortest_path(inner, true, schema)
        }
        PatternPath::AllPaths(inner) => path_translator::lower_all_paths(inner, schema),
        PatternPath::Chain { .. } => build_chain(path, schema, config),
    }
}

/// Ordinary (non-path-translator) lowering of a pattern chain into a
/// single `GraphMatch`, per spec.md §4.D rule 1: one node/edge table
/// per distinct label/rel-type referenced, inline property maps
/// absorbed directly as pattern property filters.
fn build_chain<'a>(
    path: &PatternPath<'a>,
    schema: &SchemaMap,
    _config: &Config,
) -> Result<PlanRef<'a>, PlanError> {
    let elements = path.elements();
    let mut graph_def = GraphDef::default();
    let mut plan_elements = Vec::with_capacity(elements.len());

    for element in elements {
        match element {
            PatternElement::Node(n) => {
                let (node_table, property_filters) = lower_node_pattern(n, schema)?;
                if let Some(t) = node_table {
                    graph_def.nodes.push(t);
                }
                plan_elements.push(PlanPatternElement::Node(PlanNodePattern {
                    var: n.var.unwrap_or("_anon"),
                    label: n.labels.first().map(|s| s.to_string()),
                    property_filters,
                }));
            }
            PatternElement::Rel(r) => {
                let (edge_table, property_filters) = lower_rel_pattern(r, schema)?;
                if let Some(t) = edge_table {
                    graph_def.edges.push(t);
                }
                plan_elements.push(PlanPatternElement::Rel(PlanRelPattern {
                    var: r.var,
                    rel_type: r.types.first().map(|s| s.to_string()),
                    direction: r.direction,
                    length: r.length,
                    property_filters,
                }));
            }
        }
    }

    Ok(Arc::new(LogicalPlan::GraphMatch {
        graph_def,
        elements: plan_elements,
        residual_filter: None,
        kind: JoinKind::Inner,
        time_filters: Vec::new(),
        hints: Vec::new(),
    }))
}

fn lower_node_pattern<'a>(
    n: &NodePattern<'a>,
    schema: &SchemaMap,
) -> Result<(Option<NodeTableRef>, Vec<Expr<'a>>), PlanError> {
    let table = match n.labels.first() {
        Some(label) => {
            let binding = schema.resolve_label(label)?;
            Some(NodeTableRef {
                label: label.to_string(),
                table: binding.table.clone(),
                key_column: binding.key.clone(),
            })
        }
        None => None,
    };
    let mut filters = Vec::new();
    for kv in &n.properties {
        filters.push(property_kv_to_expr(n.var, kv)?);
    }
    if let (Some(label), true) = (n.labels.first(), !n.properties.is_empty()) {
        validate_property_filters_resolve(&filters, schema, Some(label), None)?;
    }
    Ok((table, filters))
}

fn lower_rel_pattern<'a>(
    r: &RelPattern<'a>,
    schema: &SchemaMap,
) -> Result<(Option<EdgeTableRef>, Vec<Expr<'a>>), PlanError> {
    let table = match r.types.first() {
        Some(rel_type) => {
            let binding = schema.resolve_rel(rel_type)?;
            Some(EdgeTableRef {
                rel_type: rel_type.to_string(),
                table: binding.table.clone(),
                source_column: binding.source.clone(),
                target_column: binding.target.clone(),
                weight_column: binding.weight_property.clone(),
            })
        }
        None => None,
    };
    let mut filters = Vec::new();
    for kv in &r.properties {
        filters.push(property_kv_to_expr(r.var, kv)?);
    }
    if let (Some(rel_type), true) = (r.types.first(), !r.properties.is_empty()) {
        validate_property_filters_resolve(&filters, schema, None, Some(rel_type))?;
    }
    Ok((table, filters))
}

pub(crate) fn property_kv_to_expr<'a>(
    var: Option<&'a str>,
    kv: &crate::parser::ast::PropertyKV<'a>,
) -> Result<Expr<'a>, PlanError> {
    use crate::parser::ast::{BinOp, PropertyKV};
    let var = var.unwrap_or("_anon");
    match kv {
        PropertyKV::KeyValue { key, value } => Ok(Expr::Binary {
            op: BinOp::Eq,
            lhs: Box::new(Expr::Property {
                base: Box::new(Expr::Variable(var)),
                key,
            }),
            rhs: Box::new(value.clone()),
        }),
        PropertyKV::Param(name) => Ok(Expr::Binary {
            op: BinOp::Eq,
            lhs: Box::new(Expr::Variable(var)),
            rhs: Box::new(Expr::Parameter(name)),
        }),
    }
}

/// Check every property referenced by `exprs` against the schema's
/// unmapped-property policy, independent of whatever the emitter later
/// does with the expressions themselves (it still resolves the raw
/// source property name to a column at serialization time).
fn validate_property_filters_resolve(
    exprs: &[Expr<'_>],
    schema: &SchemaMap,
    label: Option<&str>,
    rel_type: Option<&str>,
) -> Result<(), PlanError> {
    for expr in exprs {
        if let Expr::Binary { lhs, .. } = expr {
            if let Expr::Property { key, .. } = lhs.as_ref() {
                let resolution = match (label, rel_type) {
                    (Some(l), _) => schema.resolve_node_property(l, key),
                    (_, Some(rt)) => schema.resolve_rel_property(rt, key),
                    _ => continue,
                };
                if let PropertyResolution::Unmapped = resolution {
                    let err = match (label, rel_type) {
                        (Some(l), _) => SchemaError::UnmappedProperty {
                            label: l.to_string(),
                            property: key.to_string(),
                        },
                        (_, Some(rt)) => SchemaError::UnmappedProperty {
                            label: rt.to_string(),
                            property: key.to_string(),
                        },
                        _ => continue,
                    };
                    return Err(PlanError::Schema(err));
                }
            }
        }
    }
    Ok(())
}

/// Filter placement (spec.md §4.D rule 2): split `predicate` at
/// top-level conjunctions; route each conjunct referencing exactly one
/// pattern variable into that variable's `NodePattern`/`RelPattern`
/// inside the owning `GraphMatch`/`ShortestPaths`/`AllPaths`; anything
/// else (zero or 2+ variables) becomes a `Filter` stacked above `plan`.
pub(crate) fn place_where<'a>(
    plan: PlanRef<'a>,
    predicate: Expr<'a>,
    schema: &SchemaMap,
) -> Result<PlanRef<'a>, PlanError> {
    let mut plan = plan;
    let mut residual = Vec::new();
    for conjunct in predicate.split_conjuncts() {
        let vars = conjunct.free_variables();
        if vars.len() == 1 {
            match try_push_into_pattern(&plan, vars[0], conjunct.clone(), schema)? {
                Some(new_plan) => {
                    plan = new_plan;
                    continue;
                }
                None => residual.push(conjunct),
            }
        } else {
            residual.push(conjunct);
        }
    }
    for conjunct in residual {
        let vars = conjunct.free_variables();
        let available = plan.output_variables();
        for v in &vars {
            if !available.contains(v) {
                return Err(PlanError::UnboundVariable {
                    name: v.to_string(),
                });
            }
        }
        plan = Arc::new(LogicalPlan::Filter {
            child: plan,
            predicate: conjunct,
        });
    }
    Ok(plan)
}

/// Attempt to push a single-variable conjunct directly into the
/// matching pattern element, searching through `Join` trees built from
/// multiple `MATCH`/`OPTIONAL MATCH` clauses. Returns `Ok(None)` (not
/// an error) when `var` is not bound by any pattern reachable from
/// `plan`, so the caller can fall back to a `Filter` - a variable
/// introduced by `WITH`/`UNWIND`/`Project` rather than a pattern is a
/// legitimate case that still needs a `Filter`, not an error.
fn try_push_into_pattern<'a>(
    plan: &PlanRef<'a>,
    var: &'a str,
    conjunct: Expr<'a>,
    schema: &SchemaMap,
) -> Result<Option<PlanRef<'a>>, PlanError> {
    match plan.as_ref() {
        LogicalPlan::GraphMatch {
            graph_def,
            elements,
            residual_filter,
            kind,
            time_filters,
            hints,
        } => {
            if let Some(idx) = elements.iter().position(|e| e.variable() == Some(var)) {
                validate_single_filter_resolves(&conjunct, &elements[idx], graph_def, schema)?;
                let mut new_elements = elements.clone();
                match &mut new_elements[idx] {
                    PlanPatternElement::Node(n) => n.property_filters.push(conjunct),
                    PlanPatternElement::Rel(r) => r.property_filters.push(conjunct),
                }
                return Ok(Some(Arc::new(LogicalPlan::GraphMatch {
                    graph_def: graph_def.clone(),
                    elements: new_elements,
                    residual_filter: residual_filter.clone(),
                    kind: *kind,
                    time_filters: time_filters.clone(),
                    hints: hints.clone(),
                })));
            }
            Ok(None)
        }
        LogicalPlan::ShortestPaths {
            src, dst, path_var, ..
        } => {
            if Some(var) == path_var.as_deref() {
                return Ok(None);
            }
            push_into_src_dst(plan, var, conjunct, src, dst)
        }
        LogicalPlan::AllPaths {
            src, dst, path_var, ..
        } => {
            if Some(var) == path_var.as_deref() {
                return Ok(None);
            }
            push_into_src_dst(plan, var, conjunct, src, dst)
        }
        LogicalPlan::Join {
            left,
            right,
            keys,
            kind,
        } => {
            if let Some(new_left) = try_push_into_pattern(left, var, conjunct.clone(), schema)? {
                return Ok(Some(Arc::new(LogicalPlan::Join {
                    left: new_left,
                    right: right.clone(),
                    keys: keys.clone(),
                    kind: *kind,
                })));
            }
            if let Some(new_right) = try_push_into_pattern(right, var, conjunct, schema)? {
                return Ok(Some(Arc::new(LogicalPlan::Join {
                    left: left.clone(),
                    right: new_right,
                    keys: keys.clone(),
                    kind: *kind,
                })));
            }
            Ok(None)
        }
        LogicalPlan::Filter { child, predicate } => {
            try_push_into_pattern(child, var, conjunct, schema).map(|opt| {
                opt.map(|new_child| {
                    Arc::new(LogicalPlan::Filter {
                        child: new_child,
                        predicate: predicate.clone(),
                    })
                })
            })
        }
        _ => Ok(None),
    }
}

fn push_into_src_dst<'a>(
    plan: &PlanRef<'a>,
    var: &'a str,
    conjunct: Expr<'a>,
    src: &PlanNodePattern<'a>,
    dst: &PlanNodePattern<'a>,
) -> Result<Option<PlanRef<'a>>, PlanError> {
    let rebuild = |new_src: PlanNodePattern<'a>, new_dst: PlanNodePattern<'a>| match plan.as_ref() {
        LogicalPlan::ShortestPaths {
            graph_def,
            path_var,
            rel_type,
            weight_column,
            max_len,
            bidirectional,
            find_all,
            residual_filter,
            time_filters,
            ..
        } => Arc::new(LogicalPlan::ShortestPaths {
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
        }),
        LogicalPlan::AllPaths {
            graph_def,
            path_var,
            rel_type,
            min_len,
            max_len,
            cycle_detect,
            residual_filter,
            time_filters,
            ..
        } => Arc::new(LogicalPlan::AllPaths {
            graph_def: graph_def.clone(),
            path_var: *path_var,
            src: new_src,
            dst: new_dst,
            rel_type: rel_type.clone(),
            min_len: *min_len,
            max_len: *max_len,
            cycle_detect: *cycle_detect,
            residual_filter: residual_filter.clone(),
            time_filters: time_filters.clone(),
        }),
        other => Arc::new(other.clone()),
    };

    if src.var == var {
        let mut new_src = src.clone();
        new_src.property_filters.push(conjunct);
        return Ok(Some(rebuild(new_src, dst.clone())));
    }
    if dst.var == var {
        let mut new_dst = dst.clone();
        new_dst.property_filters.push(conjunct);
        return Ok(Some(rebuild(src.clone(), new_dst)));
    }
    Ok(None)
}

fn validate_single_filter_resolves(
    expr: &Expr<'_>,
    element: &PlanPatternElement<'_>,
    _graph_def: &GraphDef,
    schema: &SchemaMap,
) -> Result<(), PlanError> {
    let (label, rel_type) = match element {
        PlanPatternElement::Node(n) => (n.label.clone(), None),
        PlanPatternElement::Rel(r) => (None, r.rel_type.clone()),
    };
    let key = match expr {
        Expr::Property { key, .. } => Some(*key),
        Expr::Binary { lhs, .. } => match lhs.as_ref() {
            Expr::Property { key, .. } => Some(*key),
            _ => None,
        },
        _ => None,
    };
    let (Some(key), true) = (key, label.is_some() || rel_type.is_some()) else {
        return Ok(());
    };
    let resolution = match (&label, &rel_type) {
        (Some(l), _) => schema.resolve_node_property(l, key),
        (_, Some(rt)) => schema.resolve_rel_property(rt, key),
        _ => return Ok(()),
    };
    if let PropertyResolution::Unmapped = resolution {
        return Err(PlanError::Schema(SchemaError::UnmappedProperty {
            label: label.or(rel_type).unwrap_or_default(),
            property: key.to_string(),
        }));
    }
    Ok(())
}

/// Result shaping (spec.md §4.D rule 3): `items` become a `Project`
/// (or `Aggregate` when any item is an aggregate function call),
/// followed by `Sort`/`Limit` when present.
pub(crate) fn apply_projection<'a>(
    plan: PlanRef<'a>,
    items: &[ProjectionItem<'a>],
    distinct: bool,
    order_by: Option<&OrderByClause<'a>>,
    skip: Option<i64>,
    limit: Option<i64>,
) -> PlanRef<'a> {
    let has_aggregate = items.iter().any(|i| super::is_aggregate_call(&i.expr));
    let mut plan = if has_aggregate {
        let mut group_keys = Vec::new();
        let mut aggs = Vec::new();
        for item in items {
            let projected = ProjectItem {
                expr: item.expr.clone(),
                alias: item.alias.unwrap_or(item.original_text).to_string(),
            };
            if super::is_aggregate_call(&item.expr) {
                aggs.push(projected);
            } else {
                group_keys.push(projected);
            }
        }
        Arc::new(LogicalPlan::Aggregate {
            child: plan,
            group_keys,
            aggs,
        })
    } else {
        Arc::new(LogicalPlan::Project {
            child: plan,
            items: items
                .iter()
                .map(|item| ProjectItem {
                    expr: item.expr.clone(),
                    alias: item.alias.unwrap_or(item.original_text).to_string(),
                })
                .collect(),
            distinct,
        })
    };

    if let Some(order_by) = order_by {
        plan = Arc::new(LogicalPlan::Sort {
            child: plan,
            keys: order_by.items.clone(),
        });
    }
    if skip.is_some() || limit.is_some() {
        plan = Arc::new(LogicalPlan::Limit {
            child: plan,
            n: limit.unwrap_or(i64::MAX),
            skip,
        });
    }
    plan
}

/// Not part of the public crate API (used only so `path_translator`
/// can reuse the same schema-backed `WHERE` placement semantics for
/// `shortestPath(...) WHERE ...`/`allShortestPaths(...) WHERE ...`
/// patterns, which are parsed one node up at the `MATCH` level).
pub(crate) fn index_hint(variable: &str, property: &str, column: &str) -> IndexHintAnnotation {
    IndexHintAnnotation {
        variable: variable.to_string(),
        property: property.to_string(),
        column: column.to_string(),
    }
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
    properties:
      name: DisplayName
      department: Department
      id: UserId
  Device:
    table: Devices
    key: deviceId
    properties:
      hostname: Hostname
relationship_mappings:
  LOGGED_IN:
    table: SignInLogs
    source: userId
    target: deviceId
    time_column: TimeGenerated
    properties: {}
  REPORTS_TO:
    table: ReportsTo
    source: userId
    target: managerId
    properties: {}
options:
  default_time_window: 7d
"#,
        )
        .unwrap()
    }

    #[test]
    fn single_hop_with_filter_pushes_predicate_into_pattern() {
        let schema = sample_schema();
        let config = Config::default();
        let stmt = parse(
            "MATCH (u:User)-[:LOGGED_IN]->(d:Device) WHERE u.department = 'Finance' RETURN u.name, d.hostname",
            128 * 1024,
            64,
        )
        .unwrap();
        let plan = build_plan(&stmt.query, &schema, &config).unwrap();
        // Plan is Project(GraphMatch) - the predicate should have been
        // pushed inside the GraphMatch, not left as a Filter above it.
        match plan.as_ref() {
            LogicalPlan::Project { child, .. } => match child.as_ref() {
                LogicalPlan::GraphMatch { elements, .. } => {
                    let u = elements
                        .iter()
                        .find(|e| e.variable() == Some("u"))
                        .unwrap();
                    match u {
                        PlanPatternElement::Node(n) => assert_eq!(n.property_filters.len(), 1),
                        _ => panic!("expected node pattern"),
                    }
                }
                other => panic!("expected GraphMatch, got {other:?}"),
            },
            other => panic!("expected Project, got {other:?}"),
        }
    }

    #[test]
    fn unbound_label_fails_plan_build() {
        let schema = sample_schema();
        let config = Config::default();
        let stmt = parse("MATCH (u:Ghost) RETURN u", 128 * 1024, 64).unwrap();
        let err = build_plan(&stmt.query, &schema, &config).unwrap_err();
        assert!(matches!(err, PlanError::Schema(SchemaError::UnboundLabel { .. })));
    }

    #[test]
    fn unmapped_property_fails_by_default() {
        let schema = sample_schema();
        let config = Config::default();
        let stmt = parse("MATCH (u:User) WHERE u.nickname = 'x' RETURN u", 128 * 1024, 64).unwrap();
        let err = build_plan(&stmt.query, &schema, &config).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Schema(SchemaError::UnmappedProperty { .. })
        ));
    }

    #[test]
    fn aggregate_return_builds_aggregate_node() {
        let schema = sample_schema();
        let config = Config::default();
        let stmt = parse("MATCH (n:User) RETURN n.department, count(*) AS c", 128 * 1024, 64).unwrap();
        let plan = build_plan(&stmt.query, &schema, &config).unwrap();
        assert!(matches!(plan.as_ref(), LogicalPlan::Aggregate { .. }));
    }

    #[test]
    fn with_clause_rescopes_before_continuation() {
        let schema = sample_schema();
        let config = Config::default();
        let stmt = parse(
            "MATCH (n:User) WITH n, count(*) AS c WHERE c > 1 RETURN n.name, c ORDER BY c DESC LIMIT 10",
            128 * 1024,
            64,
        )
        .unwrap();
        let plan = build_plan(&stmt.query, &schema, &config).unwrap();
        assert!(matches!(plan.as_ref(), LogicalPlan::Limit { .. }));
    }

    #[test]
    fn variable_length_two_node_pattern_stays_a_graph_match() {
        // spec.md §4.D rule 1 and the literal scenario 2 both lower a
        // bare (un-wrapped) variable-length relationship inside the
        // general `graph-match`, not through the path translator -
        // `allPaths(...)` is the only form that uses `AllPaths`.
        let schema = sample_schema();
        let config = Config::default();
        let stmt = parse(
            "MATCH (a:User)-[:REPORTS_TO*1..3]->(b:User) WHERE a.name = 'Alice' RETURN b.name",
            128 * 1024,
            64,
        )
        .unwrap();
        let plan = build_plan(&stmt.query, &schema, &config).unwrap();
        match plan.as_ref() {
            LogicalPlan::Project { child, .. } => {
                assert!(matches!(child.as_ref(), LogicalPlan::GraphMatch { .. }));
            }
            other => panic!("expected Project, got {other:?}"),
        }
    }
}
