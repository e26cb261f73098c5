//! Renders a [`GraphDef`] into the `make-graph` clause spec.md §4.F's
//! canonical shape calls for, and picks the primary (un-piped) source
//! table the clause sits under.

use crate::config::QuotePolicy;
use crate::emitter::errors::EmitError;
use crate::emitter::quoting::quote_identifier;
use crate::plan::GraphDef;

/// The table a `make-graph` clause is implicitly piped from: the first
/// edge table if the pattern has one (KQL's `make-graph` is an edges-
/// table operator), falling back to the first node table for a
/// pattern with no relationships at all.
pub fn primary_source(graph_def: &GraphDef) -> Result<&str, EmitError> {
    graph_def
        .edges
        .first()
        .map(|e| e.table.as_str())
        .or_else(|| graph_def.nodes.first().map(|n| n.table.as_str()))
        .ok_or(EmitError::EmptyGraphDef)
}

/// Build the `make-graph ... with ...` line. Per scenario 1 of spec.md
/// §8, the `with` list enumerates every node table (`Table on key`)
/// followed by every edge table (`Table on (source, target)`), in
/// discovery order.
pub fn make_graph_line(graph_def: &GraphDef, quote_policy: QuotePolicy) -> Result<String, EmitError> {
    if graph_def.nodes.is_empty() && graph_def.edges.is_empty() {
        return Err(EmitError::EmptyGraphDef);
    }
    let q = |s: &str| quote_identifier(s, quote_policy);
    let mut items = Vec::with_capacity(graph_def.nodes.len() + graph_def.edges.len());
    for node in &graph_def.nodes {
        items.push(format!("{} on {}", q(&node.table), q(&node.key_column)));
    }
    for edge in &graph_def.edges {
        items.push(format!(
            "{} on ({}, {})",
            q(&edge.table),
            q(&edge.source_column),
            q(&edge.target_column)
        ));
    }
    match graph_def.edges.first() {
        Some(edge) => Ok(format!(
            "make-graph {} --> {} with {}",
            q(&edge.source_column),
            q(&edge.target_column),
            items.join(", ")
        )),
        None => Ok(format!("make-graph with {}", items.join(", "))),
    }
}
