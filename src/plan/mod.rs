//! The logical plan tree: the algebra the planner lowers the AST into
//! and the optimizer rewrites.
//!
//! Every node is wrapped in `Arc<LogicalPlan>` rather than `Box`, the
//! teacher's convention for its own `Arc<LogicalPlan>` plan tree, chosen
//! so the optimizer can share untouched subtrees across a rewrite
//! instead of cloning them (see [`crate::optimizer::Transformed`]).
//! Parent pointers are deliberately absent: the tree is acyclic and any
//! traversal that needs ancestor context carries it explicitly on the
//! call stack, per the "no cyclic plan pointers" design note.

pub mod builder;
pub mod errors;
pub mod path_translator;

pub use builder::build_plan;
pub use errors::PlanError;

use crate::parser::ast::{Direction, Expr, RelLength, SortDirection};
use std::sync::Arc;

/// The maximum number of nodes a plan tree may contain, bounding
/// optimizer and emitter work per translation.
pub const MAX_PLAN_NODES: usize = 10_000;

pub type PlanRef<'a> = Arc<LogicalPlan<'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

/// A node table bound into a `make-graph` definition.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTableRef {
    pub label: String,
    pub table: String,
    pub key_column: String,
}

/// An edge table bound into a `make-graph` definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeTableRef {
    pub rel_type: String,
    pub table: String,
    pub source_column: String,
    pub target_column: String,
    pub weight_column: Option<String>,
}

/// The set of node/edge tables a `GraphMatch`/`ShortestPaths`/`AllPaths`
/// node's `make-graph` is synthesized from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphDef {
    pub nodes: Vec<NodeTableRef>,
    pub edges: Vec<EdgeTableRef>,
}

impl GraphDef {
    pub fn merge(&mut self, other: GraphDef) {
        for n in other.nodes {
            if !self.nodes.iter().any(|existing| existing.label == n.label) {
                self.nodes.push(n);
            }
        }
        for e in other.edges {
            if !self.edges.iter().any(|existing| existing.rel_type == e.rel_type) {
                self.edges.push(e);
            }
        }
    }
}

/// A `TimeRangeInjection` rewrite recorded against one table feeding a
/// `make-graph`: the emitter renders this as a `where <column> >=
/// ago(<window>)` filter applied to that table before it is folded into
/// the graph definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRangeFilter {
    pub table: String,
    pub column: String,
    pub window: String,
}

/// An `IndexHint` annotation: a property used in an equality comparison
/// that the schema marks as indexed. Purely advisory - the emitter
/// renders it as a KQL hint comment/clause; it changes no semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHintAnnotation {
    pub variable: String,
    pub property: String,
    pub column: String,
}

/// A node pattern inside a lowered `GraphMatch`, with property filters
/// already pushed in (column names resolved against the schema) rather
/// than left as a separate `Filter` above.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNodePattern<'a> {
    pub var: &'a str,
    pub label: Option<String>,
    /// Predicates rooted at this pattern's own variable, pushed in from
    /// an enclosing `WHERE` (or an inline `{prop: value}` pattern map).
    /// Property keys inside these expressions are still source
    /// property names; the emitter resolves them to columns against
    /// the schema at serialization time, same as every other `Expr`.
    pub property_filters: Vec<Expr<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRelPattern<'a> {
    pub var: Option<&'a str>,
    pub rel_type: Option<String>,
    pub direction: Direction,
    pub length: RelLength,
    pub property_filters: Vec<Expr<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanPatternElement<'a> {
    Node(PlanNodePattern<'a>),
    Rel(PlanRelPattern<'a>),
}

impl<'a> PlanPatternElement<'a> {
    /// The pattern variable this element binds, if named.
    pub fn variable(&self) -> Option<&'a str> {
        match self {
            PlanPatternElement::Node(n) => Some(n.var),
            PlanPatternElement::Rel(r) => r.var,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem<'a> {
    pub expr: Expr<'a>,
    pub alias: String,
}

/// The well-known aggregate function names recognized when deciding
/// whether a projection list needs an `Aggregate` node.
pub const AGGREGATE_FUNCTIONS: &[&str] = &["count", "collect", "sum", "avg", "min", "max"];

pub fn is_aggregate_call(expr: &Expr<'_>) -> bool {
    match expr {
        Expr::FunctionCall { name, .. } => AGGREGATE_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str()),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan<'a> {
    Scan {
        table: String,
        filter: Option<Expr<'a>>,
        time_range_column: Option<String>,
    },
    Filter {
        child: PlanRef<'a>,
        predicate: Expr<'a>,
    },
    Join {
        left: PlanRef<'a>,
        right: PlanRef<'a>,
        keys: Vec<(String, String)>,
        kind: JoinKind,
    },
    GraphMatch {
        graph_def: GraphDef,
        elements: Vec<PlanPatternElement<'a>>,
        /// Remaining predicate that could not be pushed into the pattern.
        residual_filter: Option<Expr<'a>>,
        kind: JoinKind,
        /// `TimeRangeInjection` rewrites applied to this node's sources.
        time_filters: Vec<TimeRangeFilter>,
        /// `IndexHint` rewrites applied to this node's sources.
        hints: Vec<IndexHintAnnotation>,
    },
    /// `UNWIND expr AS alias`. Not part of spec.md's literal plan-tree
    /// enumeration, but required to lower the read-subset's `UNWIND`
    /// clause into the algebra; modeled the way the teacher extends its
    /// own plan algebra with a dedicated node per AST clause rather than
    /// overloading `Project`.
    Unwind {
        child: PlanRef<'a>,
        expr: Expr<'a>,
        alias: &'a str,
    },
    Project {
        child: PlanRef<'a>,
        items: Vec<ProjectItem<'a>>,
        distinct: bool,
    },
    Aggregate {
        child: PlanRef<'a>,
        group_keys: Vec<ProjectItem<'a>>,
        aggs: Vec<ProjectItem<'a>>,
    },
    Sort {
        child: PlanRef<'a>,
        keys: Vec<(Expr<'a>, SortDirection)>,
    },
    Limit {
        child: PlanRef<'a>,
        n: i64,
        skip: Option<i64>,
    },
    ShortestPaths {
        graph_def: GraphDef,
        path_var: Option<&'a str>,
        src: PlanNodePattern<'a>,
        dst: PlanNodePattern<'a>,
        rel_type: Option<String>,
        weight_column: Option<String>,
        max_len: Option<u32>,
        bidirectional: bool,
        /// `true` for `allShortestPaths` (every shortest path, `KQL
        /// all_shortest_paths`); `false` for `shortestPath` (a single
        /// shortest path, `graph-shortest-paths`). Not part of spec.md's
        /// literal `ShortestPaths` field list, but needed to distinguish
        /// the two forms §4.H names without a second plan node.
        find_all: bool,
        residual_filter: Option<Expr<'a>>,
        time_filters: Vec<TimeRangeFilter>,
    },
    AllPaths {
        graph_def: GraphDef,
        path_var: Option<&'a str>,
        src: PlanNodePattern<'a>,
        dst: PlanNodePattern<'a>,
        rel_type: Option<String>,
        min_len: u32,
        max_len: u32,
        cycle_detect: bool,
        time_filters: Vec<TimeRangeFilter>,
        residual_filter: Option<Expr<'a>>,
    },
}

impl<'a> LogicalPlan<'a> {
    /// The immediate children of this node, in evaluation order.
    pub fn children(&self) -> Vec<&PlanRef<'a>> {
        match self {
            LogicalPlan::Scan { .. }
            | LogicalPlan::GraphMatch { .. }
            | LogicalPlan::ShortestPaths { .. }
            | LogicalPlan::AllPaths { .. } => Vec::new(),
            LogicalPlan::Filter { child, .. }
            | LogicalPlan::Unwind { child, .. }
            | LogicalPlan::Project { child, .. }
            | LogicalPlan::Aggregate { child, .. }
            | LogicalPlan::Sort { child, .. }
            | LogicalPlan::Limit { child, .. } => vec![child],
            LogicalPlan::Join { left, right, .. } => vec![left, right],
        }
    }

    /// Count of this node plus every descendant, used to enforce
    /// `MAX_PLAN_NODES`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Every pattern/projection variable visible as output of this node,
    /// used by filter placement and join-key inference.
    pub fn output_variables(&self) -> Vec<&'a str> {
        match self {
            LogicalPlan::GraphMatch { elements, .. } => {
                elements.iter().filter_map(|e| e.variable()).collect()
            }
            LogicalPlan::ShortestPaths { src, dst, path_var, .. }
            | LogicalPlan::AllPaths { src, dst, path_var, .. } => {
                let mut out = vec![src.var, dst.var];
                if let Some(p) = path_var {
                    out.push(p);
                }
                out
            }
            LogicalPlan::Join { left, right, .. } => {
                let mut out = left.output_variables();
                out.extend(right.output_variables());
                out
            }
            LogicalPlan::Unwind { child, alias, .. } => {
                let mut out = child.output_variables();
                out.push(alias);
                out
            }
            LogicalPlan::Filter { child, .. }
            | LogicalPlan::Sort { child, .. }
            | LogicalPlan::Limit { child, .. } => child.output_variables(),
            LogicalPlan::Project { items, .. } => items
                .iter()
                .filter_map(|i| i.expr.root_variable())
                .collect(),
            LogicalPlan::Aggregate { group_keys, .. } => group_keys
                .iter()
                .filter_map(|i| i.expr.root_variable())
                .collect(),
            LogicalPlan::Scan { .. } => Vec::new(),
        }
    }
}
