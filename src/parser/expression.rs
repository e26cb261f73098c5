//! Expression grammar: the closed set of literals, variables, property
//! access, binary/unary operators, function calls, and list/map
//! constructors.
//!
//! Operator precedence (loosest to tightest): `OR` > `AND` > `NOT` >
//! comparison (`= <> < <= > >= IN CONTAINS STARTS WITH ENDS WITH`) >
//! additive (`+ -`) > multiplicative (`* / %`) > unary (`NOT -`) >
//! postfix property access > primary.
//!
//! Recursion depth is threaded explicitly through every parsing
//! function (no global/thread-local counter) and checked against
//! `max_depth`; exceeding it records a sentinel marker in the `nom`
//! error accumulator that the parser's top-level entry point converts
//! into `ParseError::ExpressionTooDeep`.

use super::ast::{BinOp, Expr, Literal, UnOp};
use super::common::{
    boolean_literal, float_literal, identifier, integer_literal, is_reserved, keyword,
    null_literal, parameter, raw_string_literal, ws,
};
use super::errors::CypherParsingError;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, multispace0};
use nom::combinator::{cut, map, opt, peek, value, verify};
use nom::multi::separated_list0;
use nom::sequence::{delimited, pair, preceded, separated_pair};
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

/// Sentinel context string recorded when the depth budget is exceeded;
/// `mod.rs`'s top-level parse function scans for it.
pub const DEPTH_EXCEEDED_MARKER: &str = "__expression_too_deep__";

fn too_deep_err(input: &str) -> nom::Err<CypherParsingError<'_>> {
    nom::Err::Failure(CypherParsingError {
        errors: vec![(input, DEPTH_EXCEEDED_MARKER)],
    })
}

fn check_depth(input: &str, depth: u32, max_depth: u32) -> Result<(), nom::Err<CypherParsingError<'_>>> {
    if depth > max_depth {
        Err(too_deep_err(input))
    } else {
        Ok(())
    }
}

pub fn parse_expr<'a>(input: &'a str, max_depth: u32) -> PResult<'a, Expr<'a>> {
    parse_or(input, max_depth, 0)
}

fn parse_or<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, first) = parse_and(input, max_depth, depth + 1)?;
    let mut acc = first;
    let mut input = input;
    loop {
        let attempt = preceded(ws(keyword("or")), |i| parse_and(i, max_depth, depth + 1)).parse(input);
        match attempt {
            Ok((rest, rhs)) => {
                acc = Expr::Binary {
                    op: BinOp::Or,
                    lhs: Box::new(acc),
                    rhs: Box::new(rhs),
                };
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, acc))
}

fn parse_and<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, first) = parse_not(input, max_depth, depth + 1)?;
    let mut acc = first;
    let mut input = input;
    loop {
        let attempt = preceded(ws(keyword("and")), |i| parse_not(i, max_depth, depth + 1)).parse(input);
        match attempt {
            Ok((rest, rhs)) => {
                acc = Expr::Binary {
                    op: BinOp::And,
                    lhs: Box::new(acc),
                    rhs: Box::new(rhs),
                };
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, acc))
}

fn parse_not<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, _) = multispace0.parse(input)?;
    if let Ok((rest, _)) = keyword("not").parse(input) {
        let (rest, expr) = parse_not(rest, max_depth, depth + 1)?;
        return Ok((
            rest,
            Expr::Unary {
                op: UnOp::Not,
                expr: Box::new(expr),
            },
        ));
    }
    parse_comparison(input, max_depth, depth + 1)
}

fn comparison_op(input: &str) -> PResult<'_, BinOp> {
    ws(alt((
        value(BinOp::Ne, tag("<>")),
        value(BinOp::Le, tag("<=")),
        value(BinOp::Ge, tag(">=")),
        value(BinOp::Lt, tag("<")),
        value(BinOp::Gt, tag(">")),
        value(BinOp::Eq, tag("=")),
        value(BinOp::StartsWith, |i| {
            let (i, _) = keyword("starts").parse(i)?;
            let (i, _) = multispace0.parse(i)?;
            keyword("with").parse(i)
        }),
        value(BinOp::EndsWith, |i| {
            let (i, _) = keyword("ends").parse(i)?;
            let (i, _) = multispace0.parse(i)?;
            keyword("with").parse(i)
        }),
        value(BinOp::Contains, keyword("contains")),
        value(BinOp::In, keyword("in")),
    )))
    .parse(input)
}

fn parse_comparison<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, lhs) = parse_additive(input, max_depth, depth + 1)?;
    match comparison_op(input) {
        Ok((rest, op)) => {
            let (rest, rhs) = parse_additive(rest, max_depth, depth + 1)?;
            Ok((
                rest,
                Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
            ))
        }
        Err(_) => Ok((input, lhs)),
    }
}

fn parse_additive<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, first) = parse_multiplicative(input, max_depth, depth + 1)?;
    let mut acc = first;
    let mut input = input;
    loop {
        let op_res = ws(alt((value(BinOp::Add, char('+')), value(BinOp::Sub, char('-'))))).parse(input);
        match op_res {
            Ok((rest, op)) => {
                let (rest, rhs) = parse_multiplicative(rest, max_depth, depth + 1)?;
                acc = Expr::Binary {
                    op,
                    lhs: Box::new(acc),
                    rhs: Box::new(rhs),
                };
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, acc))
}

fn parse_multiplicative<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, first) = parse_unary(input, max_depth, depth + 1)?;
    let mut acc = first;
    let mut input = input;
    loop {
        let op_res = ws(alt((
            value(BinOp::Mul, char('*')),
            value(BinOp::Div, char('/')),
            value(BinOp::Mod, char('%')),
        )))
        .parse(input);
        match op_res {
            Ok((rest, op)) => {
                let (rest, rhs) = parse_unary(rest, max_depth, depth + 1)?;
                acc = Expr::Binary {
                    op,
                    lhs: Box::new(acc),
                    rhs: Box::new(rhs),
                };
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, acc))
}

fn parse_unary<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, _) = multispace0.parse(input)?;
    if let Ok((rest, _)) = char::<&str, CypherParsingError<'_>>('-').parse(input) {
        // Don't swallow `-` belonging to a negative numeric literal;
        // numeric literals already parse their own leading `-`.
        if peek(digit_or_dot).parse(rest).is_err() {
            let (rest, expr) = parse_unary(rest, max_depth, depth + 1)?;
            return Ok((
                rest,
                Expr::Unary {
                    op: UnOp::Neg,
                    expr: Box::new(expr),
                },
            ));
        }
    }
    parse_postfix(input, max_depth, depth + 1)
}

fn digit_or_dot(input: &str) -> PResult<'_, char> {
    nom::character::complete::one_of("0123456789.").parse(input)
}

fn parse_postfix<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, mut base) = parse_primary(input, max_depth, depth + 1)?;
    let mut input = input;
    loop {
        let attempt = preceded(ws(char('.')), identifier).parse(input);
        match attempt {
            Ok((rest, key)) => {
                base = Expr::Property {
                    base: Box::new(base),
                    key,
                };
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, base))
}

fn parse_primary<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    check_depth(input, depth, max_depth)?;
    let (input, _) = multispace0.parse(input)?;
    alt((
        |i| parse_parenthesized(i, max_depth, depth + 1),
        |i| parse_list(i, max_depth, depth + 1),
        |i| parse_map(i, max_depth, depth + 1),
        parse_literal,
        // `count(*)` - the only place a bare `*` is a valid expression.
        map(char('*'), |_| Expr::Variable("*")),
        |i| parse_function_or_variable(i, max_depth, depth + 1),
        map(parameter, Expr::Parameter),
    ))
    .parse(input)
}

fn parse_parenthesized<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    delimited(
        ws(char('(')),
        |i| parse_or(i, max_depth, depth + 1),
        ws(cut(char(')'))),
    )
    .parse(input)
}

fn parse_list<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    map(
        delimited(
            ws(char('[')),
            separated_list0(ws(char(',')), |i| parse_or(i, max_depth, depth + 1)),
            ws(cut(char(']'))),
        ),
        Expr::List,
    )
    .parse(input)
}

fn map_key(input: &str) -> PResult<'_, &str> {
    identifier(input)
}

fn parse_map<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    map(
        delimited(
            ws(char('{')),
            separated_list0(
                ws(char(',')),
                separated_pair(ws(map_key), ws(char(':')), |i| parse_or(i, max_depth, depth + 1)),
            ),
            ws(cut(char('}'))),
        ),
        Expr::Map,
    )
    .parse(input)
}

fn parse_literal(input: &str) -> PResult<'_, Expr<'_>> {
    alt((
        map(value((), null_literal), |_| Expr::Literal(Literal::Null)),
        map(boolean_literal, |b| Expr::Literal(Literal::Boolean(b))),
        map(raw_string_literal, |s| Expr::Literal(Literal::String(s))),
        map(float_literal_strict, |f| Expr::Literal(Literal::Float(f))),
        map(integer_literal, |n| Expr::Literal(Literal::Integer(n))),
    ))
    .parse(input)
}

/// Only accept a float literal if it actually contains a `.` or
/// exponent; otherwise integers like `42` would be consumed here first.
fn float_literal_strict(input: &str) -> PResult<'_, f64> {
    let (rest, matched) = nom::combinator::recognize(nom::number::complete::recognize_float)
        .parse(input)?;
    if matched.contains('.') || matched.contains('e') || matched.contains('E') {
        let (_, f) = float_literal(input)?;
        Ok((rest, f))
    } else {
        Err(nom::Err::Error(CypherParsingError {
            errors: vec![(input, "not a float literal")],
        }))
    }
}

fn parse_function_or_variable<'a>(input: &'a str, max_depth: u32, depth: u32) -> PResult<'a, Expr<'a>> {
    let (input, name) = verify(identifier, |s: &str| !is_reserved(s)).parse(input)?;
    let call_attempt = preceded(
        ws(char('(')),
        pair(
            opt(ws(keyword("distinct"))),
            separated_list0(ws(char(',')), |i| parse_or(i, max_depth, depth + 1)),
        ),
    )
    .parse(input);
    match call_attempt {
        Ok((rest, (distinct, args))) => {
            let (rest, _) = ws(cut(char(')'))).parse(rest)?;
            Ok((
                rest,
                Expr::FunctionCall {
                    name,
                    args,
                    distinct: distinct.is_some(),
                },
            ))
        }
        Err(_) => Ok((input, Expr::Variable(name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Expr<'_> {
        let (rest, expr) = parse_expr(s, 64).expect("expression parses");
        assert!(rest.trim().is_empty(), "leftover input: {rest:?}");
        expr
    }

    #[test]
    fn parses_property_equality() {
        let expr = parse("u.department = 'Finance'");
        match expr {
            Expr::Binary { op: BinOp::Eq, lhs, rhs } => {
                assert!(matches!(*lhs, Expr::Property { key: "department", .. }));
                assert!(matches!(*rhs, Expr::Literal(Literal::String("Finance"))));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("a = 1 OR b = 2 AND c = 3");
        match expr {
            Expr::Binary { op: BinOp::Or, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::And, .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parses_function_call() {
        let expr = parse("count(n)");
        match expr {
            Expr::FunctionCall { name: "count", args, distinct } => {
                assert_eq!(args.len(), 1);
                assert!(!distinct);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn split_conjuncts_flattens_and_chain() {
        let expr = parse("a.x = 1 AND b.y = 2 AND c.z = 3");
        let conjuncts = expr.split_conjuncts();
        assert_eq!(conjuncts.len(), 3);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let deeply_nested = "(".repeat(100) + "1" + &")".repeat(100);
        let err = parse_expr(&deeply_nested, 8);
        assert!(err.is_err());
    }
}
