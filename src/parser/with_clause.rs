//! `WITH` clause parsing. Produces only the clause's own header; the
//! recursive continuation (`next: Box<Query>`) is assembled by the
//! top-level query parser in `mod.rs`, since `WITH` can be followed by
//! arbitrary further reading clauses, another `WITH`, or a terminal
//! `RETURN`.

use super::ast::ProjectionItem;
use super::common::{keyword, ws, ws1};
use super::errors::CypherParsingError;
use super::order_by_clause::{limit_clause, order_by_clause, skip_clause};
use super::projection::projection_items;
use super::where_clause::where_clause;
use crate::parser::ast::{OrderByClause, WhereClause};
use nom::combinator::opt;
use nom::sequence::preceded;
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

pub struct WithHeader<'a> {
    pub items: Vec<ProjectionItem<'a>>,
    pub distinct: bool,
    pub where_clause: Option<WhereClause<'a>>,
    pub order_by: Option<OrderByClause<'a>>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub fn with_header<'a>(
    source: &'a str,
    max_depth: u32,
) -> impl FnMut(&'a str) -> PResult<'a, WithHeader<'a>> {
    move |input: &'a str| {
        let (input, _) = ws(keyword("with")).parse(input)?;
        let (input, distinct) = opt(ws(keyword("distinct"))).parse(input)?;
        let (input, items) = projection_items(source, max_depth)(input)?;
        let (input, order_by) = opt(|i| order_by_clause(i, max_depth)).parse(input)?;
        let (input, skip) = opt(skip_clause).parse(input)?;
        let (input, limit) = opt(limit_clause).parse(input)?;
        let (input, where_clause) = opt(preceded(ws1, |i| where_clause(i, max_depth))).parse(input)?;
        Ok((
            input,
            WithHeader {
                items,
                distinct: distinct.is_some(),
                where_clause,
                order_by,
                skip,
                limit,
            },
        ))
    }
}
