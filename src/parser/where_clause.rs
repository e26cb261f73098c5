//! `WHERE` clause parsing.

use super::ast::WhereClause;
use super::common::{keyword, ws};
use super::errors::CypherParsingError;
use super::expression::parse_expr;
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

pub fn where_clause(input: &str, max_depth: u32) -> PResult<'_, WhereClause<'_>> {
    let (input, _) = ws(keyword("where")).parse(input)?;
    let (input, expr) = parse_expr(input, max_depth)?;
    Ok((input, WhereClause { expr }))
}
