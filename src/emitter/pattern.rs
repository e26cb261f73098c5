//! Renders the `(node)-[rel]->(node)` pattern chain inside a
//! `graph-match` operator line.
//!
//! Property filters carried on a `PlanNodePattern`/`PlanRelPattern` are
//! deliberately NOT rendered inline here (no `{prop: value}` map
//! syntax) - scenario 1 of spec.md §8 shows a pattern filter pushed
//! into `u`'s pattern element still surfacing as a `where` conjunct,
//! not inline pattern syntax, so [`emit_graph_match`](super::emit_graph_match)
//! renders every element's `property_filters` as `where` text instead.

use crate::config::QuotePolicy;
use crate::emitter::quoting::quote_identifier;
use crate::parser::ast::{Direction, RelLength};
use crate::plan::{PlanPatternElement, PlanRelPattern};

pub fn render_chain(elements: &[PlanPatternElement<'_>], policy: QuotePolicy) -> String {
    let mut out = String::new();
    for element in elements {
        match element {
            PlanPatternElement::Node(n) => {
                out.push('(');
                out.push_str(n.var);
                if let Some(label) = &n.label {
                    out.push(':');
                    out.push_str(&quote_identifier(label, policy));
                }
                out.push(')');
            }
            PlanPatternElement::Rel(r) => out.push_str(&render_rel(r, policy)),
        }
    }
    out
}

fn render_rel(rel: &PlanRelPattern<'_>, policy: QuotePolicy) -> String {
    let mut bracket = String::from("[");
    if let Some(var) = rel.var {
        bracket.push_str(var);
    }
    if let Some(rel_type) = &rel.rel_type {
        bracket.push(':');
        bracket.push_str(&quote_identifier(rel_type, policy));
    }
    bracket.push_str(&length_suffix(&rel.length));
    bracket.push(']');

    match rel.direction {
        Direction::Outgoing => format!("-{bracket}->"),
        Direction::Incoming => format!("<-{bracket}-"),
        Direction::Either => format!("-{bracket}-"),
    }
}

fn length_suffix(length: &RelLength) -> String {
    match length {
        RelLength::Fixed(1) => String::new(),
        RelLength::Fixed(n) => format!("*{n}"),
        RelLength::Range { min, max: Some(max) } => format!("*{min}..{max}"),
        RelLength::Range { min, max: None } => format!("*{min}.."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanNodePattern, PlanRelPattern};

    #[test]
    fn renders_single_hop_matching_scenario_one() {
        let elements = vec![
            PlanPatternElement::Node(PlanNodePattern {
                var: "u",
                label: Some("User".to_string()),
                property_filters: Vec::new(),
            }),
            PlanPatternElement::Rel(PlanRelPattern {
                var: None,
                rel_type: Some("LOGGED_IN".to_string()),
                direction: Direction::Outgoing,
                length: RelLength::Fixed(1),
                property_filters: Vec::new(),
            }),
            PlanPatternElement::Node(PlanNodePattern {
                var: "d",
                label: Some("Device".to_string()),
                property_filters: Vec::new(),
            }),
        ];
        assert_eq!(
            render_chain(&elements, QuotePolicy::Minimal),
            "(u:User)-[:LOGGED_IN]->(d:Device)"
        );
    }

    #[test]
    fn renders_variable_length_hop_matching_scenario_two() {
        let elements = vec![
            PlanPatternElement::Node(PlanNodePattern {
                var: "a",
                label: Some("User".to_string()),
                property_filters: Vec::new(),
            }),
            PlanPatternElement::Rel(PlanRelPattern {
                var: None,
                rel_type: Some("REPORTS_TO".to_string()),
                direction: Direction::Outgoing,
                length: RelLength::Range { min: 1, max: Some(3) },
                property_filters: Vec::new(),
            }),
            PlanPatternElement::Node(PlanNodePattern {
                var: "b",
                label: Some("User".to_string()),
                property_filters: Vec::new(),
            }),
        ];
        assert_eq!(
            render_chain(&elements, QuotePolicy::Minimal),
            "(a:User)-[:REPORTS_TO*1..3]->(b:User)"
        );
    }
}
