//! `UNWIND expr AS alias` clause parsing.

use super::ast::UnwindClause;
use super::common::{identifier, keyword, ws, ws1};
use super::errors::CypherParsingError;
use super::expression::parse_expr;
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

pub fn unwind_clause(input: &str, max_depth: u32) -> PResult<'_, UnwindClause<'_>> {
    let (input, _) = ws(keyword("unwind")).parse(input)?;
    let (input, expr) = parse_expr(input, max_depth)?;
    let (input, _) = ws1.parse(input)?;
    let (input, _) = ws(keyword("as")).parse(input)?;
    let (input, alias) = identifier(input)?;
    Ok((input, UnwindClause { expr, alias }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unwind() {
        let (rest, u) = unwind_clause("UNWIND [1,2,3] AS x", 64).unwrap();
        assert!(rest.is_empty());
        assert_eq!(u.alias, "x");
    }
}
