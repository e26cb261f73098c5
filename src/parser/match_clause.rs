//! `MATCH` / `OPTIONAL MATCH` clause parsing.

use super::ast::MatchClause;
use super::common::{keyword, ws, ws1};
use super::errors::CypherParsingError;
use super::path_pattern::pattern_list;
use super::where_clause::where_clause;
use nom::combinator::opt;
use nom::sequence::preceded;
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

pub fn match_clause(input: &str, max_depth: u32) -> PResult<'_, MatchClause<'_>> {
    let (input, _) = ws(keyword("match")).parse(input)?;
    let (input, patterns) = pattern_list(input)?;
    let (input, where_clause) =
        opt(preceded(ws1, |i| where_clause(i, max_depth))).parse(input)?;
    Ok((
        input,
        MatchClause {
            patterns,
            optional: false,
            where_clause,
        },
    ))
}

pub fn optional_match_clause(input: &str, max_depth: u32) -> PResult<'_, MatchClause<'_>> {
    let (input, _) = ws(keyword("optional")).parse(input)?;
    let (input, _) = ws1.parse(input)?;
    let (input, _) = ws(keyword("match")).parse(input)?;
    let (input, patterns) = pattern_list(input)?;
    let (input, where_clause) =
        opt(preceded(ws1, |i| where_clause(i, max_depth))).parse(input)?;
    Ok((
        input,
        MatchClause {
            patterns,
            optional: true,
            where_clause,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_match_with_where() {
        let (rest, m) = match_clause("MATCH (u:User) WHERE u.id = 1", 64).unwrap();
        assert!(rest.is_empty());
        assert!(!m.optional);
        assert!(m.where_clause.is_some());
        assert_eq!(m.patterns.len(), 1);
    }

    #[test]
    fn parses_optional_match() {
        let (rest, m) = optional_match_clause("OPTIONAL MATCH (a)-[:R]->(b)", 64).unwrap();
        assert!(rest.is_empty());
        assert!(m.optional);
    }
}
