//! Shared `expr [AS alias]` projection-item list parsing, used by both
//! `WITH` and `RETURN`.

use super::ast::ProjectionItem;
use super::common::{identifier, keyword, ws};
use super::errors::CypherParsingError;
use super::errors::offset_of;
use super::expression::parse_expr;
use nom::combinator::opt;
use nom::multi::separated_list1;
use nom::sequence::preceded;
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

fn projection_item<'a>(
    source: &'a str,
    max_depth: u32,
) -> impl FnMut(&'a str) -> PResult<'a, ProjectionItem<'a>> {
    move |input: &'a str| {
        let start = offset_of(source, input);
        let (input, expr) = parse_expr(input, max_depth)?;
        let end = offset_of(source, input);
        let (input, alias) = opt(preceded(ws(keyword("as")), identifier)).parse(input)?;
        Ok((
            input,
            ProjectionItem {
                expr,
                alias,
                original_text: &source[start..end],
            },
        ))
    }
}

pub fn projection_items<'a>(
    source: &'a str,
    max_depth: u32,
) -> impl FnMut(&'a str) -> PResult<'a, Vec<ProjectionItem<'a>>> {
    move |input: &'a str| {
        separated_list1(
            ws(nom::character::complete::char(',')),
            projection_item(source, max_depth),
        )
        .parse(input)
    }
}
