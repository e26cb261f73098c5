//! `RETURN` clause parsing.

use super::ast::ReturnClause;
use super::common::{keyword, ws};
use super::errors::CypherParsingError;
use super::order_by_clause::{limit_clause, order_by_clause, skip_clause};
use super::projection::projection_items;
use nom::combinator::opt;
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

pub fn return_clause<'a>(
    source: &'a str,
    max_depth: u32,
) -> impl FnMut(&'a str) -> PResult<'a, ReturnClause<'a>> {
    move |input: &'a str| {
        let (input, _) = ws(keyword("return")).parse(input)?;
        let (input, distinct) = opt(ws(keyword("distinct"))).parse(input)?;
        let (input, items) = projection_items(source, max_depth)(input)?;
        let (input, order_by) = opt(|i| order_by_clause(i, max_depth)).parse(input)?;
        let (input, skip) = opt(skip_clause).parse(input)?;
        let (input, limit) = opt(limit_clause).parse(input)?;
        Ok((
            input,
            ReturnClause {
                distinct: distinct.is_some(),
                items,
                order_by,
                skip,
                limit,
            },
        ))
    }
}
