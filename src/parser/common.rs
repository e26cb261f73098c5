//! Shared lexical building blocks: whitespace/comment skipping,
//! identifiers, literals, and parameters. Built on `nom`'s combinator
//! primitives the way the teacher's `common.rs` is.

use super::errors::CypherParsingError;
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while, take_while1};
use nom::character::complete::{char, digit1, multispace0, multispace1};
use nom::combinator::{map, map_res, opt, recognize, value};
use nom::multi::many0;
use nom::number::complete::recognize_float;
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};

type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

/// Strip `//` line comments and `/* */` block comments from the full
/// source text before parsing. Comments never carry semantic content,
/// so stripping them up-front (rather than threading a "skip comments"
/// step through every combinator) keeps the grammar simple; byte
/// offsets of diagnostics are computed against this stripped text.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
        } else {
            // SAFETY-free: operate a char at a time to stay UTF-8 safe.
            let ch_len = input[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            out.push_str(&input[i..i + ch_len]);
            i += ch_len;
        }
    }
    out
}

/// Wrap a parser so it consumes surrounding whitespace.
pub fn ws<'a, O, F>(mut inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, Output = O, Error = CypherParsingError<'a>>,
{
    move |input: &'a str| {
        let (input, _) = multispace0.parse(input)?;
        let (input, out) = inner.parse(input)?;
        let (input, _) = multispace0.parse(input)?;
        Ok((input, out))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A case-sensitive Cypher identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        take_while1(is_ident_start),
        take_while(is_ident_continue),
    ))
    .parse(input)
}

/// Match a keyword case-insensitively, requiring the following
/// character (if any) not continue the identifier (so `MATCH` doesn't
/// accidentally match a prefix of `MATCHER`).
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| {
        let (rest, matched) = nom::bytes::complete::tag_no_case(kw).parse(input)?;
        if let Some(c) = rest.chars().next() {
            if is_ident_continue(c) {
                return Err(nom::Err::Error(CypherParsingError {
                    errors: vec![(input, "keyword boundary")],
                }));
            }
        }
        Ok((rest, matched))
    }
}

pub fn parameter(input: &str) -> PResult<'_, &str> {
    preceded(char('$'), identifier).parse(input)
}

fn single_quoted_string(input: &str) -> PResult<'_, String> {
    delimited(
        char('\''),
        map(
            opt(escaped_transform(
                is_not("'\\"),
                '\\',
                alt((
                    value("'", tag("'")),
                    value("\\", tag("\\")),
                    value("\n", tag("n")),
                    value("\t", tag("t")),
                    value("\r", tag("r")),
                    value("\"", tag("\"")),
                )),
            )),
            |s: Option<String>| s.unwrap_or_default(),
        ),
        char('\''),
    )
    .parse(input)
}

fn double_quoted_string(input: &str) -> PResult<'_, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\"\\"),
                '\\',
                alt((
                    value("\"", tag("\"")),
                    value("\\", tag("\\")),
                    value("\n", tag("n")),
                    value("\t", tag("t")),
                    value("\r", tag("r")),
                    value("'", tag("'")),
                )),
            )),
            |s: Option<String>| s.unwrap_or_default(),
        ),
        char('"'),
    )
    .parse(input)
}

/// Parses a string literal, returning the unescaped text. Since the
/// unescaped text may differ from the source slice (escapes are
/// resolved), the caller is expected to intern/leak or otherwise own
/// the result; the AST's `Literal::String` variant borrows the *raw*
/// source slice instead and defers unescaping to evaluation time, to
/// stay zero-copy. This helper is exposed for validators/tests that
/// need the resolved value.
pub fn resolved_string_literal(input: &str) -> PResult<'_, String> {
    alt((single_quoted_string, double_quoted_string)).parse(input)
}

/// Parses a quoted string literal and returns the *raw* (still escaped)
/// slice between the quotes, preserving the AST's zero-copy borrowing.
pub fn raw_string_literal(input: &str) -> PResult<'_, &str> {
    let quote = input.chars().next();
    match quote {
        Some('\'') => {
            let (rest, raw) = recognize(delimited(
                char('\''),
                many0(alt((recognize(pair(char('\\'), nom::character::complete::anychar)), is_not("'\\")))),
                char('\''),
            ))
            .parse(input)?;
            Ok((rest, &raw[1..raw.len() - 1]))
        }
        Some('"') => {
            let (rest, raw) = recognize(delimited(
                char('"'),
                many0(alt((recognize(pair(char('\\'), nom::character::complete::anychar)), is_not("\"\\")))),
                char('"'),
            ))
            .parse(input)?;
            Ok((rest, &raw[1..raw.len() - 1]))
        }
        _ => Err(nom::Err::Error(CypherParsingError {
            errors: vec![(input, "expected string literal")],
        })),
    }
}

pub fn integer_literal(input: &str) -> PResult<'_, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })
    .parse(input)
}

pub fn float_literal(input: &str) -> PResult<'_, f64> {
    map_res(recognize_float, |s: &str| s.parse::<f64>()).parse(input)
}

pub fn boolean_literal(input: &str) -> PResult<'_, bool> {
    alt((
        value(true, keyword("true")),
        value(false, keyword("false")),
    ))
    .parse(input)
}

pub fn null_literal(input: &str) -> PResult<'_, ()> {
    value((), keyword("null")).parse(input)
}

/// At least one whitespace character, used to separate two keywords
/// that would otherwise run into each other (`ORDER BY`).
pub fn ws1(input: &str) -> PResult<'_, ()> {
    value((), multispace1).parse(input)
}

pub const RESERVED_WORDS: &[&str] = &[
    "match", "optional", "where", "with", "return", "order", "by", "skip", "limit", "unwind",
    "and", "or", "not", "in", "contains", "starts", "ends", "true", "false", "null", "as",
    "distinct", "union", "all", "create", "set", "remove", "delete", "call", "detach",
];

pub fn is_reserved(ident: &str) -> bool {
    let lower = ident.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}
