//! The five independent checks behind [`super::validate`]. Each is a
//! small pure function over `(source query text or AST, candidate KQL
//! text, schema)` that accumulates findings rather than failing fast,
//! the same "collect every defect in one pass" shape as
//! `schema::SchemaValidator::validate`.
//!
//! None of these checks execute or fully parse the candidate KQL - per
//! spec.md §4.G the validator "never executes KQL", and candidate KQL
//! is a different grammar than the Cypher parser this crate owns, so
//! check 1 is a hand-written structural scanner, not a grammar.

use crate::parser::ast::{CypherStatement, PatternElement, ProjectionItem, Query};
use crate::schema::SchemaMap;
use std::collections::HashSet;

/// The outcome of a single check: whether it passed outright, plus any
/// findings. A check can report `warnings` even when `passed` is true
/// (e.g. a fallback was used); only `errors` withhold a pass.
#[derive(Debug, Default)]
pub struct CheckOutcome {
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckOutcome {
    fn ok() -> Self {
        Self {
            passed: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn failed(errors: Vec<String>) -> Self {
        Self {
            passed: false,
            errors,
            warnings: Vec::new(),
        }
    }
}

const KNOWN_TOP_LEVEL_OPERATORS: &[&str] = &[
    "make-graph",
    "graph-match",
    "graph-shortest-paths",
    "all_shortest_paths",
    "all_paths",
    "where",
    "project",
    "summarize",
    "sort",
    "take",
    "serialize",
    "mv-expand",
    "join",
    "distinct",
    "let",
    "union",
    "extend",
];

/// Check 1: balanced quotes/parentheses/brackets, and every pipe stage
/// opens with a recognized operator keyword.
pub fn syntactic_well_formedness(candidate: &str) -> CheckOutcome {
    let mut errors = Vec::new();

    if let Err(msg) = check_balanced(candidate) {
        errors.push(msg);
    }

    for line in candidate.lines() {
        let stage = line.trim().trim_start_matches('|').trim();
        if stage.is_empty() || stage.starts_with("//") {
            continue;
        }
        let first_word = stage.split_whitespace().next().unwrap_or("");
        let is_let_binding = first_word == "let";
        let is_known = KNOWN_TOP_LEVEL_OPERATORS
            .iter()
            .any(|op| first_word == *op || stage.starts_with(op));
        let is_bare_source = !line.trim_start().starts_with('|');
        if !is_known && !is_let_binding && !is_bare_source {
            errors.push(format!("unrecognized top-level operator in stage: `{stage}`"));
        }
    }

    if errors.is_empty() {
        CheckOutcome::ok()
    } else {
        CheckOutcome::failed(errors)
    }
}

fn check_balanced(candidate: &str) -> Result<(), String> {
    let mut parens = 0i32;
    let mut brackets = 0i32;
    let mut in_single_quote = false;
    let mut chars = candidate.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' if !in_single_quote => in_single_quote = true,
            '\'' => in_single_quote = false,
            '\\' if in_single_quote => {
                chars.next();
            }
            '(' if !in_single_quote => parens += 1,
            ')' if !in_single_quote => parens -= 1,
            '[' if !in_single_quote => brackets += 1,
            ']' if !in_single_quote => brackets -= 1,
            _ => {}
        }
        if parens < 0 || brackets < 0 {
            return Err("unbalanced parentheses or brackets".to_string());
        }
    }
    if in_single_quote {
        return Err("unterminated string literal".to_string());
    }
    if parens != 0 {
        return Err("unbalanced parentheses".to_string());
    }
    if brackets != 0 {
        return Err("unbalanced brackets".to_string());
    }
    Ok(())
}

/// Check 2: every table name named in the candidate's `make-graph ...
/// with ...` clause is a table this schema actually declares.
pub fn schema_references(candidate: &str, schema: &SchemaMap) -> CheckOutcome {
    let known_tables: HashSet<&str> = schema
        .node_mappings
        .values()
        .map(|b| b.table.as_str())
        .chain(schema.relationship_mappings.values().map(|b| b.table.as_str()))
        .collect();

    let mut errors = Vec::new();
    for line in candidate.lines() {
        let trimmed = line.trim();
        let Some(with_idx) = trimmed.find(" with ") else {
            continue;
        };
        if !trimmed.contains("make-graph") {
            continue;
        }
        let with_list = &trimmed[with_idx + " with ".len()..];
        for item in with_list.split(',') {
            let table = item.trim().split_whitespace().next().unwrap_or("");
            let table = table.trim_matches(['[', ']']);
            if table.is_empty() {
                continue;
            }
            if !known_tables.contains(table) {
                errors.push(format!("table `{table}` referenced in candidate is not declared in the schema map"));
            }
        }
    }

    if errors.is_empty() {
        CheckOutcome::ok()
    } else {
        CheckOutcome::failed(errors)
    }
}

/// Check 3: a loose heuristic for operator/type mismatch - text
/// operators (`has`, `startswith`, `endswith`, `contains`) compared
/// against a bare numeric literal, or numeric comparisons against a
/// quoted string literal.
pub fn operator_type_compatibility(candidate: &str) -> CheckOutcome {
    let mut errors = Vec::new();
    const TEXT_OPS: &[&str] = &["has", "has_cs", "startswith", "startswith_cs", "endswith", "endswith_cs"];
    for line in candidate.lines() {
        for op in TEXT_OPS {
            if let Some(pos) = find_word(line, op) {
                let rhs = line[pos + op.len()..].trim_start();
                let looks_numeric = rhs
                    .split(|c: char| c == ' ' || c == ')')
                    .next()
                    .map(|tok| !tok.is_empty() && tok.chars().all(|c| c.is_ascii_digit() || c == '.'))
                    .unwrap_or(false);
                if looks_numeric {
                    errors.push(format!(
                        "text operator `{op}` compared against a bare numeric literal in `{}`",
                        line.trim()
                    ));
                }
            }
        }
    }
    if errors.is_empty() {
        CheckOutcome::ok()
    } else {
        CheckOutcome::failed(errors)
    }
}

fn find_word(haystack: &str, word: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(idx) = haystack[start..].find(word) {
        let abs = start + idx;
        let before_ok = abs == 0 || !haystack.as_bytes()[abs - 1].is_ascii_alphanumeric();
        let after = abs + word.len();
        let after_ok = after >= haystack.len() || !haystack.as_bytes()[after].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(abs);
        }
        start = abs + word.len();
    }
    None
}

/// Check 4: every pattern variable and label/relationship-type bound in
/// the source query's `MATCH` patterns appears somewhere in the
/// candidate text, and vice versa is approximated by requiring the
/// candidate to at least mention one table per declared graph element
/// (a full vice-versa symbol walk would require parsing KQL, which this
/// validator deliberately does not do).
pub fn symbol_alignment(source: &CypherStatement<'_>, candidate: &str) -> CheckOutcome {
    let mut symbols = HashSet::new();
    collect_query_symbols(&source.query, &mut symbols);
    for branch in &source.unions {
        collect_query_symbols(&branch.query, &mut symbols);
    }

    let mut errors = Vec::new();
    for symbol in &symbols {
        if !candidate.contains(symbol.as_str()) {
            errors.push(format!(
                "symbol `{symbol}` from the source pattern does not appear in the candidate; \
                 check for a missing or misspelled label/type mapping"
            ));
        }
    }

    if errors.is_empty() {
        CheckOutcome::ok()
    } else {
        CheckOutcome::failed(errors)
    }
}

fn collect_query_symbols<'a>(query: &Query<'a>, out: &mut HashSet<String>) {
    for clause in &query.reading_clauses {
        for pattern in &clause.patterns {
            for element in pattern.elements() {
                match element {
                    PatternElement::Node(n) => {
                        for label in &n.labels {
                            out.insert(label.to_string());
                        }
                    }
                    PatternElement::Rel(r) => {
                        for rel_type in &r.types {
                            out.insert(rel_type.to_string());
                        }
                    }
                }
            }
        }
    }
    if let Some(with) = &query.with_clause {
        collect_query_symbols(&with.next, out);
    }
}

/// Check 5: the number of top-level `RETURN` projection items matches
/// the number of comma-separated items in the candidate's final
/// `project`/`summarize ... by` stage.
pub fn projection_arity(source: &CypherStatement<'_>, candidate: &str) -> CheckOutcome {
    let Some(return_items) = final_return_items(&source.query) else {
        return CheckOutcome::ok();
    };
    let expected = return_items.len();

    let Some(actual) = candidate_projection_arity(candidate) else {
        // No `project`/`summarize` stage to compare against (e.g. a bare
        // path-variable RETURN from a shortest-path query) - nothing to
        // check.
        return CheckOutcome::ok();
    };

    if actual == expected {
        CheckOutcome::ok()
    } else {
        CheckOutcome::failed(vec![format!(
            "RETURN has {expected} item(s) but the candidate's final projection has {actual}"
        )])
    }
}

fn final_return_items<'a, 'b>(query: &'b Query<'a>) -> Option<&'b [ProjectionItem<'a>]> {
    if let Some(with) = &query.with_clause {
        return final_return_items(&with.next);
    }
    query.return_clause.as_ref().map(|r| r.items.as_slice())
}

fn candidate_projection_arity(candidate: &str) -> Option<usize> {
    let last_stage = candidate
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with("project ") || l.contains("| project ") || l.contains("project "))?;
    let list = last_stage.rsplit("project ").next()?;
    Some(split_top_level_commas(list).len())
}

fn split_top_level_commas(list: &str) -> Vec<&str> {
    let mut depth = 0i32;
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = list[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn balanced_candidate_passes_syntax_check() {
        let candidate = "SignInLogs\n| make-graph userId --> deviceId with Users on userId, Devices on deviceId, SignInLogs on (userId, deviceId)\n| graph-match (u:Users)-[:LOGGED_IN]->(d:Devices) project u.DisplayName";
        let outcome = syntactic_well_formedness(candidate);
        assert!(outcome.passed, "{:?}", outcome.errors);
    }

    #[test]
    fn unbalanced_parens_fail_syntax_check() {
        let candidate = "SignInLogs\n| make-graph userId --> deviceId with Users on userId (";
        let outcome = syntactic_well_formedness(candidate);
        assert!(!outcome.passed);
    }

    #[test]
    fn unknown_table_fails_schema_reference_check() {
        let schema = SchemaMap::from_yaml_str(
            r#"
node_mappings:
  User:
    table: Users
    key: userId
    properties: {}
relationship_mappings: {}
"#,
        )
        .unwrap();
        let candidate = "Ghosts\n| make-graph userId --> deviceId with Ghosts on userId";
        let outcome = schema_references(candidate, &schema);
        assert!(!outcome.passed);
    }

    #[test]
    fn text_operator_against_number_fails_type_check() {
        let candidate = "x | where u.Name has 5";
        let outcome = operator_type_compatibility(candidate);
        assert!(!outcome.passed);
    }

    #[test]
    fn missing_label_fails_symbol_alignment() {
        let stmt = parse("MATCH (u:User)-[:LOGGED_IN]->(d:Device) RETURN u.name", 64 * 1024, 32).unwrap();
        let candidate = "SignInLogs\n| make-graph userId --> deviceId with Users on userId\n| graph-match (u:Users)-[:LOGGED_IN]->(d) project u.DisplayName";
        let outcome = symbol_alignment(&stmt, candidate);
        assert!(!outcome.passed);
        assert!(outcome.errors.iter().any(|e| e.contains("Device")));
    }

    #[test]
    fn matching_projection_arity_passes() {
        let stmt = parse("MATCH (u:User) RETURN u.name, u.id", 64 * 1024, 32).unwrap();
        let candidate = "Users\n| graph-match (u:Users) project u.DisplayName, u.Id";
        let outcome = projection_arity(&stmt, candidate);
        assert!(outcome.passed, "{:?}", outcome.errors);
    }

    #[test]
    fn mismatched_projection_arity_fails() {
        let stmt = parse("MATCH (u:User) RETURN u.name, u.id", 64 * 1024, 32).unwrap();
        let candidate = "Users\n| graph-match (u:Users) project u.DisplayName";
        let outcome = projection_arity(&stmt, candidate);
        assert!(!outcome.passed);
    }
}
