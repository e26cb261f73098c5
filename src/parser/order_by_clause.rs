//! `ORDER BY`, `SKIP`, and `LIMIT` parsing. Grouped together since all
//! three can trail a `WITH` or `RETURN` clause in the same position.

use super::ast::{OrderByClause, SortDirection};
use super::common::{integer_literal, keyword, ws, ws1};
use super::errors::CypherParsingError;
use super::expression::parse_expr;
use nom::combinator::{map, opt, value};
use nom::multi::separated_list1;
use nom::sequence::preceded;
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

fn direction(input: &str) -> PResult<'_, SortDirection> {
    map(
        opt(ws(nom::branch::alt((
            value(SortDirection::Desc, keyword("desc")),
            value(SortDirection::Desc, keyword("descending")),
            value(SortDirection::Asc, keyword("asc")),
            value(SortDirection::Asc, keyword("ascending")),
        )))),
        |d| d.unwrap_or(SortDirection::Asc),
    )
    .parse(input)
}

pub fn order_by_clause(input: &str, max_depth: u32) -> PResult<'_, OrderByClause<'_>> {
    let (input, _) = ws(keyword("order")).parse(input)?;
    let (input, _) = ws1.parse(input)?;
    let (input, _) = ws(keyword("by")).parse(input)?;
    let (input, items) = separated_list1(ws(nom::character::complete::char(',')), |i| {
        let (i, expr) = parse_expr(i, max_depth)?;
        let (i, dir) = direction(i)?;
        Ok((i, (expr, dir)))
    })
    .parse(input)?;
    Ok((input, OrderByClause { items }))
}

pub fn skip_clause(input: &str) -> PResult<'_, i64> {
    preceded(ws(keyword("skip")), ws(integer_literal)).parse(input)
}

pub fn limit_clause(input: &str) -> PResult<'_, i64> {
    preceded(ws(keyword("limit")), ws(integer_literal)).parse(input)
}
