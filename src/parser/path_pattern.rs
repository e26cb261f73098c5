//! The pattern mini-language: `(node)-[rel]->(node)` chains, including
//! labels, inline property maps, relationship direction/types, and the
//! variable-length-path sugar (`[*]`, `[*n]`, `[*..m]`, `[*n..]`,
//! `[*n..m]`).

use super::ast::{
    Direction, Expr, NodePattern, PatternElement, PatternPath, PropertyKV, RelLength, RelPattern,
};
use super::common::{identifier, integer_literal, is_reserved, keyword, parameter, ws};
use super::errors::CypherParsingError;
use super::expression::parse_expr;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, multispace0};
use nom::combinator::{cut, map, opt, verify};
use nom::multi::{many1, separated_list0, separated_list1};
use nom::sequence::{delimited, pair, preceded, separated_pair};
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

fn var_name(input: &str) -> PResult<'_, &str> {
    verify(identifier, |s: &str| !is_reserved(s)).parse(input)
}

fn labels(input: &str) -> PResult<'_, Vec<&str>> {
    preceded(ws(char(':')), separated_list1(ws(char('|')), identifier)).parse(input)
}

fn property_kv(input: &str) -> PResult<'_, PropertyKV<'_>> {
    alt((
        map(parameter, PropertyKV::Param),
        map(
            separated_pair(ws(identifier), ws(char(':')), |i| parse_expr(i, 64)),
            |(key, value)| PropertyKV::KeyValue { key, value },
        ),
    ))
    .parse(input)
}

fn property_map(input: &str) -> PResult<'_, Vec<PropertyKV<'_>>> {
    delimited(
        ws(char('{')),
        separated_list0(ws(char(',')), property_kv),
        ws(cut(char('}'))),
    )
    .parse(input)
}

/// `(var?:Label1|Label2 {props}?)`
pub fn node_pattern(input: &str) -> PResult<'_, NodePattern<'_>> {
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, var) = opt(var_name).parse(input)?;
    let (input, lbls) = opt(labels).parse(input)?;
    let (input, props) = opt(ws(property_map)).parse(input)?;
    let (input, _) = ws(cut(char(')'))).parse(input)?;
    Ok((
        input,
        NodePattern {
            var,
            labels: lbls.unwrap_or_default(),
            properties: props.unwrap_or_default(),
        },
    ))
}

fn non_negative(input: &str) -> PResult<'_, u32> {
    map(integer_literal, |n| n.max(0) as u32).parse(input)
}

/// Variable-length sugar inside `[...]`: `*`, `*n`, `*..m`, `*n..`,
/// `*n..m`.
fn variable_length(input: &str) -> PResult<'_, RelLength> {
    let (input, _) = ws(char('*')).parse(input)?;
    let (input, min) = opt(non_negative).parse(input)?;
    let (input, has_range) = opt(ws(tag(".."))).parse(input)?;
    let (input, max) = if has_range.is_some() {
        opt(non_negative).parse(input)?
    } else {
        (input, None)
    };
    let length = if has_range.is_some() {
        RelLength::Range {
            min: min.unwrap_or(1),
            max,
        }
    } else {
        match min {
            // `[*n]` - exactly n hops.
            Some(n) => RelLength::Range { min: n, max: Some(n) },
            // bare `[*]` - one or more, unbounded.
            None => RelLength::Range { min: 1, max: None },
        }
    };
    Ok((input, length))
}

fn rel_body(input: &str) -> PResult<'_, RelPattern<'_>> {
    let (input, var) = opt(var_name).parse(input)?;
    let (input, types) = opt(labels).parse(input)?;
    let (input, length) = opt(variable_length).parse(input)?;
    let (input, props) = opt(ws(property_map)).parse(input)?;
    Ok((
        input,
        RelPattern {
            var,
            types: types.unwrap_or_default(),
            direction: Direction::Either,
            length: length.unwrap_or(RelLength::Fixed(1)),
            properties: props.unwrap_or_default(),
        },
    ))
}

/// `-[...]-`, `-[...]->`, `<-[...]-`.
fn rel_pattern(input: &str) -> PResult<'_, RelPattern<'_>> {
    let (input, left_arrow) = opt(tag("<")).parse(input)?;
    let (input, _) = char('-').parse(input)?;
    let (input, body) = opt(delimited(ws(char('[')), rel_body, ws(cut(char(']'))))).parse(input)?;
    let (input, _) = char('-').parse(input)?;
    let (input, right_arrow) = opt(tag(">")).parse(input)?;

    let direction = match (left_arrow.is_some(), right_arrow.is_some()) {
        (true, false) => Direction::Incoming,
        (false, true) => Direction::Outgoing,
        _ => Direction::Either,
    };

    let mut rel = body.unwrap_or(RelPattern {
        var: None,
        types: Vec::new(),
        direction: Direction::Either,
        length: RelLength::Fixed(1),
        properties: Vec::new(),
    });
    rel.direction = direction;
    Ok((input, rel))
}

/// A full chain: `(a)-[:R]->(b)-[:R2]->(c)...`.
fn pattern_chain(input: &str) -> PResult<'_, Vec<PatternElement<'_>>> {
    let (input, first) = node_pattern(input)?;
    let mut elements = vec![PatternElement::Node(first)];
    let (input, rest) = many1_or_empty(input, &mut elements)?;
    let _ = rest;
    Ok((input, elements))
}

fn many1_or_empty<'a>(
    mut input: &'a str,
    elements: &mut Vec<PatternElement<'a>>,
) -> PResult<'a, ()> {
    loop {
        let attempt = pair(ws(rel_pattern), ws(node_pattern)).parse(input);
        match attempt {
            Ok((rest, (rel, node))) => {
                elements.push(PatternElement::Rel(rel));
                elements.push(PatternElement::Node(node));
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, ()))
}

fn path_var(input: &str) -> PResult<'_, &str> {
    let (input, var) = var_name(input)?;
    let (input, _) = ws(char('=')).parse(input)?;
    Ok((input, var))
}

fn chain_path(input: &str) -> PResult<'_, PatternPath<'_>> {
    let (input, path_var) = opt(path_var).parse(input)?;
    let (input, elements) = pattern_chain(input)?;
    Ok((
        input,
        PatternPath::Chain {
            path_var,
            elements,
        },
    ))
}

fn shortest_path_call(input: &str) -> PResult<'_, PatternPath<'_>> {
    alt((
        map(
            preceded(
                keyword("shortestpath"),
                delimited(ws(char('(')), chain_path, ws(cut(char(')')))),
            ),
            |inner| PatternPath::ShortestPath(Box::new(inner)),
        ),
        map(
            preceded(
                keyword("allshortestpaths"),
                delimited(ws(char('(')), chain_path, ws(cut(char(')')))),
            ),
            |inner| PatternPath::AllShortestPaths(Box::new(inner)),
        ),
        map(
            preceded(
                keyword("allpaths"),
                delimited(ws(char('(')), chain_path, ws(cut(char(')')))),
            ),
            |inner| PatternPath::AllPaths(Box::new(inner)),
        ),
    ))
    .parse(input)
}

/// A single pattern in a `MATCH` clause's comma-separated pattern list,
/// optionally bound to a path variable and optionally wrapped in
/// `shortestPath(...)`/`allShortestPaths(...)`.
pub fn pattern_path(input: &str) -> PResult<'_, PatternPath<'_>> {
    let (input, _) = multispace0.parse(input)?;
    alt((shortest_path_path_var, shortest_path_call, chain_path)).parse(input)
}

fn shortest_path_path_var(input: &str) -> PResult<'_, PatternPath<'_>> {
    let (input, var) = path_var(input)?;
    let (input, inner) = shortest_path_call(input)?;
    Ok((
        input,
        match inner {
            PatternPath::ShortestPath(p) => PatternPath::ShortestPath(Box::new(with_path_var(*p, var))),
            PatternPath::AllShortestPaths(p) => {
                PatternPath::AllShortestPaths(Box::new(with_path_var(*p, var)))
            }
            PatternPath::AllPaths(p) => PatternPath::AllPaths(Box::new(with_path_var(*p, var))),
            other => other,
        },
    ))
}

fn with_path_var<'a>(path: PatternPath<'a>, var: &'a str) -> PatternPath<'a> {
    match path {
        PatternPath::Chain { elements, .. } => PatternPath::Chain {
            path_var: Some(var),
            elements,
        },
        other => other,
    }
}

pub fn pattern_list(input: &str) -> PResult<'_, Vec<PatternPath<'_>>> {
    separated_list1(ws(char(',')), pattern_path).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_hop_pattern() {
        let (rest, path) = pattern_path("(u:User)-[:LOGGED_IN]->(d:Device)").unwrap();
        assert!(rest.is_empty());
        assert_eq!(path.elements().len(), 3);
    }

    #[test]
    fn parses_variable_length_range() {
        let (_, path) = pattern_path("(a:User)-[:REPORTS_TO*1..3]->(b:User)").unwrap();
        match &path.elements()[1] {
            PatternElement::Rel(r) => {
                assert_eq!(r.length, RelLength::Range { min: 1, max: Some(3) });
            }
            _ => panic!("expected relationship"),
        }
    }

    #[test]
    fn star_alone_is_unbounded_from_one() {
        let (_, path) = pattern_path("(a)-[:R*]->(b)").unwrap();
        match &path.elements()[1] {
            PatternElement::Rel(r) => assert_eq!(r.length, RelLength::Range { min: 1, max: None }),
            _ => panic!("expected relationship"),
        }
    }

    #[test]
    fn star_n_is_fixed_range() {
        let (_, path) = pattern_path("(a)-[:R*2]->(b)").unwrap();
        match &path.elements()[1] {
            PatternElement::Rel(r) => assert_eq!(r.length, RelLength::Range { min: 2, max: Some(2) }),
            _ => panic!("expected relationship"),
        }
    }

    #[test]
    fn parses_shortest_path_wrapper() {
        let (_, path) = pattern_path("shortestPath((s:Node)-[:EDGE*]-(t:Node))").unwrap();
        assert!(matches!(path, PatternPath::ShortestPath(_)));
    }

    #[test]
    fn parses_all_paths_wrapper() {
        let (_, path) = pattern_path("allPaths((s:Node)-[:EDGE*1..3]-(t:Node))").unwrap();
        assert!(matches!(path, PatternPath::AllPaths(_)));
    }

    #[test]
    fn bare_variable_length_pattern_is_a_plain_chain() {
        let (_, path) = pattern_path("(a:User)-[:REPORTS_TO*1..3]->(b:User)").unwrap();
        assert!(matches!(path, PatternPath::Chain { .. }));
    }

    #[test]
    fn parses_incoming_direction() {
        let (_, path) = pattern_path("(a)<-[:R]-(b)").unwrap();
        match &path.elements()[1] {
            PatternElement::Rel(r) => assert_eq!(r.direction, Direction::Incoming),
            _ => panic!("expected relationship"),
        }
    }
}
