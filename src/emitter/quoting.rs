//! Identifier and string-literal quoting for emitted KQL text.
//!
//! spec.md §4.F: "identifiers are quoted only when they collide with
//! KQL keywords; string literals are single-quoted and
//! backslash-escaped." `QuotePolicy::Always` (config.emitter.quote_policy)
//! overrides the minimal policy and brackets every identifier, which a
//! deployment may prefer for defense against future keyword additions.

use crate::config::QuotePolicy;

/// A representative set of KQL reserved/operator keywords an emitted
/// table or column name might collide with. Not exhaustive (KQL has no
/// single canonical reserved-word list the way SQL standards do), but
/// covers the operators and clause keywords this emitter itself uses,
/// which is the collision that actually matters for round-trip
/// correctness of the text this crate produces.
const KQL_KEYWORDS: &[&str] = &[
    "and", "or", "not", "by", "on", "with", "as", "asc", "desc", "kind", "where", "project",
    "extend", "summarize", "join", "union", "sort", "take", "limit", "top", "distinct", "let",
    "print", "range", "datatable", "serialize", "mv-expand", "make-graph", "graph-match",
    "graph-shortest-paths", "all_paths", "all_shortest_paths", "has", "in", "contains",
    "startswith", "endswith", "true", "false", "null", "count", "sum", "avg", "min", "max",
];

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn collides_with_keyword(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    KQL_KEYWORDS.contains(&lower.as_str())
}

/// Quote `name` per `policy`, bracket-quoting (`['name']`) when the
/// policy demands it or the name is not a plain identifier / collides
/// with a KQL keyword.
pub fn quote_identifier(name: &str, policy: QuotePolicy) -> String {
    let needs_quoting = match policy {
        QuotePolicy::Always => true,
        QuotePolicy::Minimal => !is_plain_identifier(name) || collides_with_keyword(name),
    };
    if needs_quoting {
        format!("['{}']", name.replace('\'', "\\'"))
    } else {
        name.to_string()
    }
}

/// Render a Cypher string literal as a single-quoted, backslash-escaped
/// KQL string literal.
pub fn quote_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}
