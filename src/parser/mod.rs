//! Cypher lexer/parser: turns source text into a `CypherStatement` AST
//! or a structured `ParseError`.

pub mod ast;
mod common;
pub mod errors;
mod expression;
mod match_clause;
mod order_by_clause;
mod path_pattern;
mod projection;
mod return_clause;
mod unwind_clause;
mod where_clause;
mod with_clause;

pub use common::strip_comments;
pub use errors::ParseError;

use ast::{CypherStatement, MatchClause, Query, UnionBranch, UnionType, WithClause};
use common::{keyword, ws};
use errors::{span_of, CypherParsingError};
use expression::DEPTH_EXCEEDED_MARKER;
use match_clause::{match_clause, optional_match_clause};
use nom::branch::alt;
use nom::character::complete::multispace0;
use nom::combinator::{map, opt};
use nom::multi::many0;
use nom::sequence::preceded;
use nom::{IResult, Parser};
use return_clause::return_clause;
use unwind_clause::unwind_clause;
use with_clause::with_header;

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

/// Keywords of write/administrative clauses that the grammar recognizes
/// syntactically (so the parser can name the clause in the error) but
/// never lowers. Only the read-subset of openCypher is supported.
const UNSUPPORTED_CLAUSE_KEYWORDS: &[&str] = &["create", "set", "remove", "delete", "detach", "call"];

/// Parse the (already comment-stripped) source text of a query into a
/// `CypherStatement`.
///
/// Callers are expected to run [`strip_comments`] first and keep the
/// resulting owned `String` alive for as long as the returned AST is in
/// use - the AST borrows `source` directly, matching the zero-copy
/// lifetime-parameterized convention used throughout this module.
/// `translate::translate` does this for the crate's public entry point.
///
/// `max_query_bytes` enforces the size cap (`ParseError::TooLarge`);
/// `max_depth` bounds expression recursion (`ParseError::ExpressionTooDeep`).
pub fn parse(
    source: &str,
    max_query_bytes: usize,
    max_depth: u32,
) -> Result<CypherStatement<'_>, ParseError> {
    if source.len() > max_query_bytes {
        return Err(ParseError::TooLarge {
            limit: max_query_bytes,
            actual: source.len(),
        });
    }
    if source.trim().is_empty() {
        return Err(ParseError::EmptyQuery);
    }

    match cypher_statement(source, max_depth) {
        Ok((remaining, statement)) => {
            let remaining_trimmed = remaining.trim_start();
            if !remaining_trimmed.is_empty() {
                let after_semi = remaining_trimmed.strip_prefix(';').unwrap_or(remaining_trimmed);
                if !after_semi.trim().is_empty() {
                    return Err(ParseError::TrailingInput {
                        span: span_of(source, remaining),
                        text: remaining_trimmed.chars().take(40).collect(),
                    });
                }
            }
            Ok(statement)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(convert_error(source, e)),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::UnexpectedToken {
            span: span_of(source, source),
            expected: "more input".to_string(),
            found: "end of input".to_string(),
        }),
    }
}


fn cypher_statement<'a>(source: &'a str, max_depth: u32) -> PResult<'a, CypherStatement<'a>> {
    let (input, _) = multispace0.parse(source)?;
    reject_unsupported_clause(input)?;
    let (input, query) = query(source, max_depth).parse(input)?;
    let (input, unions) = many0(|i| union_branch(source, max_depth, i)).parse(input)?;
    Ok((input, CypherStatement { query, unions }))
}

fn union_branch<'a>(
    source: &'a str,
    max_depth: u32,
    input: &'a str,
) -> PResult<'a, UnionBranch<'a>> {
    let (input, _) = ws(keyword("union")).parse(input)?;
    let (input, union_type) = map(opt(ws(keyword("all"))), |all| {
        if all.is_some() {
            UnionType::All
        } else {
            UnionType::Distinct
        }
    })
    .parse(input)?;
    let (input, q) = query(source, max_depth).parse(input)?;
    Ok((
        input,
        UnionBranch {
            union_type,
            query: q,
        },
    ))
}

/// A recursive query body: reading clauses, optional in-line `WHERE`,
/// `UNWIND`s, an optional `WITH` (owning everything after it), and an
/// optional terminal `RETURN`.
fn query<'a>(source: &'a str, max_depth: u32) -> impl FnMut(&'a str) -> PResult<'a, Query<'a>> {
    move |input: &'a str| {
        let (input, reading_clauses) = many0(|i| reading_clause(i, max_depth)).parse(input)?;
        reject_unsupported_clause(input)?;
        let (input, where_clause) =
            opt(preceded(multispace0, |i| where_clause::where_clause(i, max_depth))).parse(input)?;
        let (input, unwind_clauses) = many0(|i| unwind_clause(i, max_depth)).parse(input)?;
        reject_unsupported_clause(input)?;

        let with_attempt = with_header(source, max_depth)(input);
        if let Ok((rest, header)) = with_attempt {
            let (rest, next) = query(source, max_depth)(rest)?;
            return Ok((
                rest,
                Query {
                    reading_clauses,
                    unwind_clauses,
                    where_clause,
                    with_clause: Some(Box::new(WithClause {
                        items: header.items,
                        distinct: header.distinct,
                        where_clause: header.where_clause,
                        order_by: header.order_by,
                        skip: header.skip,
                        limit: header.limit,
                        next: Box::new(next),
                    })),
                    return_clause: None,
                },
            ));
        }

        let (input, return_clause) = opt(return_clause(source, max_depth)).parse(input)?;
        Ok((
            input,
            Query {
                reading_clauses,
                unwind_clauses,
                where_clause,
                with_clause: None,
                return_clause,
            },
        ))
    }
}

fn reading_clause(input: &str, max_depth: u32) -> PResult<'_, MatchClause<'_>> {
    alt((
        |i| optional_match_clause(i, max_depth),
        |i| match_clause(i, max_depth),
    ))
    .parse(input)
}

/// After consuming every clause this parser understands, check whether
/// the next keyword names a write/administrative clause it deliberately
/// does not lower, and fail with a precise diagnostic naming it rather
/// than a generic "unexpected token".
fn reject_unsupported_clause(input: &str) -> Result<(), nom::Err<CypherParsingError<'_>>> {
    let trimmed = input.trim_start();
    for kw in UNSUPPORTED_CLAUSE_KEYWORDS {
        if let Ok((rest, _)) = keyword(kw).parse(trimmed) {
            if rest.chars().next().map(|c| !c.is_alphanumeric() && c != '_').unwrap_or(true) {
                return Err(nom::Err::Failure(CypherParsingError {
                    errors: vec![(trimmed, "unsupported_clause")],
                }));
            }
        }
    }
    Ok(())
}

fn convert_error(source: &str, err: CypherParsingError<'_>) -> ParseError {
    if let Some((input, ctx)) = err.errors.last() {
        if *ctx == DEPTH_EXCEEDED_MARKER {
            return ParseError::ExpressionTooDeep {
                span: span_of(source, input),
                max_depth: 0,
            };
        }
        if *ctx == "unsupported_clause" {
            let clause: String = input
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            return ParseError::UnsupportedClause {
                span: span_of(source, input),
                clause,
            };
        }
        return ParseError::UnexpectedToken {
            span: span_of(source, input),
            expected: ctx.to_string(),
            found: input.chars().take(24).collect(),
        };
    }
    ParseError::UnexpectedToken {
        span: span_of(source, source),
        expected: "valid Cypher query".to_string(),
        found: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(s: &str) -> CypherStatement<'_> {
        parse(s, 128 * 1024, 64).unwrap_or_else(|e| panic!("failed to parse {s:?}: {e}"))
    }

    #[test]
    fn parses_single_hop_with_filter() {
        let stmt = parse_ok(
            "MATCH (u:User)-[:LOGGED_IN]->(d:Device) WHERE u.department = 'Finance' RETURN u.name, d.hostname",
        );
        assert_eq!(stmt.query.reading_clauses.len(), 1);
        assert!(stmt.query.where_clause.is_some());
        let ret = stmt.query.return_clause.expect("return clause");
        assert_eq!(ret.items.len(), 2);
    }

    #[test]
    fn parses_with_chain() {
        let stmt = parse_ok("MATCH (n) WITH n, count(*) AS c WHERE c > 1 RETURN n, c ORDER BY c DESC LIMIT 10");
        let with = stmt.query.with_clause.expect("with clause");
        assert_eq!(with.items.len(), 2);
        assert!(with.where_clause.is_some());
        assert!(with.next.return_clause.is_some());
    }

    #[test]
    fn parses_union_all() {
        let stmt = parse_ok("MATCH (a:User) RETURN a.name UNION ALL MATCH (b:User) RETURN b.name");
        assert_eq!(stmt.unions.len(), 1);
        assert_eq!(stmt.unions[0].union_type, UnionType::All);
    }

    #[test]
    fn empty_query_is_rejected() {
        let err = parse("   ", 128 * 1024, 64).unwrap_err();
        assert!(matches!(err, ParseError::EmptyQuery));
    }

    #[test]
    fn oversized_query_is_rejected() {
        let q = "MATCH (n) RETURN n";
        let err = parse(q, 4, 64).unwrap_err();
        assert!(matches!(err, ParseError::TooLarge { .. }));
    }

    #[test]
    fn write_clause_is_rejected_with_precise_error() {
        let err = parse("MATCH (n) DELETE n", 128 * 1024, 64).unwrap_err();
        match err {
            ParseError::UnsupportedClause { clause, .. } => assert_eq!(clause, "delete"),
            other => panic!("expected UnsupportedClause, got {other:?}"),
        }
    }

    #[test]
    fn trailing_input_is_rejected() {
        let err = parse("MATCH (n) RETURN n GARBAGE", 128 * 1024, 64).unwrap_err();
        assert!(matches!(err, ParseError::TrailingInput { .. }));
    }

    #[test]
    fn comments_are_stripped() {
        let cleaned = strip_comments("// comment\nMATCH (n) RETURN n /* inline */");
        let stmt = parse(&cleaned, 128 * 1024, 64).unwrap();
        assert!(stmt.query.return_clause.is_some());
    }

    #[test]
    fn variable_length_path_parses() {
        let stmt = parse_ok("MATCH (a:User)-[:REPORTS_TO*1..3]->(b:User) WHERE a.name = 'Alice' RETURN b.name");
        assert_eq!(stmt.query.reading_clauses.len(), 1);
    }
}
