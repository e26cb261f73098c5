//! Malformed-query robustness: the parser must return a structured
//! `ParseError` rather than panic, for every shape of broken input.

use kqlgraph::parser::{parse, ParseError};

const MAX_BYTES: usize = 128 * 1024;
const MAX_DEPTH: u32 = 64;

fn parse_err(source: &str) -> ParseError {
    parse(source, MAX_BYTES, MAX_DEPTH).expect_err(&format!("expected a parse error for {source:?}"))
}

#[test]
fn malformed_queries_return_structured_errors_without_panicking() {
    let malformed = [
        "MATCH",
        "MATCH (",
        "MATCH )",
        "MATCH (n",
        "MATCH n)",
        "MATCH (n-",
        "MATCH (n)-[",
        "MATCH (n)-[]-",
        "RETURN",
        "WHERE",
        "MATCH (n) RETURN n WHERE",
    ];
    for source in malformed {
        let _ = parse(source, MAX_BYTES, MAX_DEPTH);
    }
}

#[test]
fn empty_and_whitespace_only_input_is_empty_query() {
    assert!(matches!(parse_err(""), ParseError::EmptyQuery));
    assert!(matches!(parse_err("   \n\t  "), ParseError::EmptyQuery));
}

#[test]
fn oversized_query_is_too_large() {
    let query = format!("MATCH (n) WHERE n.id = '{}' RETURN n", "x".repeat(200_000));
    match parse(&query, MAX_BYTES, MAX_DEPTH) {
        Err(ParseError::TooLarge { limit, .. }) => assert_eq!(limit, MAX_BYTES),
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn write_clauses_are_rejected_as_unsupported() {
    for source in ["CREATE (n:User)", "MATCH (n) SET n.x = 1", "MATCH (n) DELETE n", "MATCH (n) REMOVE n.x"] {
        match parse(source, MAX_BYTES, MAX_DEPTH) {
            Err(ParseError::UnsupportedClause { .. }) => {}
            other => panic!("expected UnsupportedClause for {source:?}, got {other:?}"),
        }
    }
}

#[test]
fn deeply_nested_expression_trips_the_depth_guard() {
    let mut expr = "1".to_string();
    for _ in 0..200 {
        expr = format!("({expr} + 1)");
    }
    let query = format!("MATCH (n) WHERE n.x = {expr} RETURN n");
    match parse(&query, MAX_BYTES, MAX_DEPTH) {
        Err(ParseError::ExpressionTooDeep { .. }) => {}
        other => panic!("expected ExpressionTooDeep, got {other:?}"),
    }
}

#[test]
fn trailing_garbage_after_a_valid_query_is_rejected() {
    match parse("MATCH (n) RETURN n GARBAGE TOKENS", MAX_BYTES, MAX_DEPTH) {
        Err(ParseError::TrailingInput { .. }) => {}
        other => panic!("expected TrailingInput, got {other:?}"),
    }
}

#[test]
fn comments_are_stripped_before_parsing() {
    let cleaned = kqlgraph::parser::strip_comments(
        "// header comment\nMATCH (n:User) /* inline */ RETURN n.name // trailing",
    );
    let stmt = parse(&cleaned, MAX_BYTES, MAX_DEPTH).expect("parses after comment stripping");
    assert!(stmt.query.return_clause.is_some());
}

#[test]
fn variable_length_bounds_are_accepted_in_every_written_form() {
    for (pattern, source_tail) in [
        ("*", "RETURN b"),
        ("*3", "RETURN b"),
        ("*..5", "RETURN b"),
        ("*2..", "RETURN b"),
        ("*1..3", "RETURN b"),
    ] {
        let query = format!("MATCH (a:User)-[:REPORTS_TO{pattern}]->(b:User) {source_tail}");
        parse(&query, MAX_BYTES, MAX_DEPTH).unwrap_or_else(|e| panic!("{query:?} failed: {e}"));
    }
}
