//! Parser error types.
//!
//! `CypherParsingError` is the internal `nom` error accumulator (mirrors
//! `nom::error::ParseError`/`ContextError` so `nom::error::context(...)`
//! annotations flow through combinators); `ParseError` is the public,
//! `thiserror`-backed enum returned at the parser's boundary and is what
//! composes into the crate-level `TranslateError`.

use crate::diagnostics::Span;
use nom::error::{ContextError, ErrorKind, ParseError as NomParseError};
use std::fmt;
use thiserror::Error;

/// Internal accumulator error used while combinators run. Kept distinct
/// from the public `ParseError` so `nom`'s error-composition machinery
/// (`from_error_kind`/`append`/`add_context`) never leaks into the public
/// API.
#[derive(Debug, PartialEq)]
pub struct CypherParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> NomParseError<&'a str> for CypherParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        CypherParsingError {
            errors: vec![(input, "unexpected input")],
        }
    }

    fn append(input: &'a str, _kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unexpected input"));
        other
    }
}

impl<'a> ContextError<&'a str> for CypherParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for CypherParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            let snippet: String = input.chars().take(32).collect();
            writeln!(f, "{ctx}: {snippet:?}")?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for CypherParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        CypherParsingError {
            errors: vec![(err.input, "unable to parse")],
        }
    }
}

/// The structured parse error the crate's public API surfaces.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty query")]
    EmptyQuery,

    #[error("query exceeds the {limit}-byte size limit ({actual} bytes)")]
    TooLarge { limit: usize, actual: usize },

    #[error("unexpected token at offset {span:?}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("unterminated string literal starting at offset {span:?}")]
    UnterminatedString { span: Span },

    #[error("unknown escape sequence '\\{ch}' at offset {span:?}")]
    UnknownEscape { span: Span, ch: char },

    #[error("trailing input after the query at offset {span:?}: {text:?}")]
    TrailingInput { span: Span, text: String },

    #[error("expression exceeds maximum recursion depth {max_depth} at offset {span:?}")]
    ExpressionTooDeep { span: Span, max_depth: u32 },

    #[error("malformed pattern at offset {span:?}: {message}")]
    PatternMalformed { span: Span, message: String },

    #[error("unsupported clause '{clause}' at offset {span:?}: only the read-subset of openCypher is supported")]
    UnsupportedClause { span: Span, clause: String },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::EmptyQuery | ParseError::TooLarge { .. } => Span::none(),
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnterminatedString { span }
            | ParseError::UnknownEscape { span, .. }
            | ParseError::TrailingInput { span, .. }
            | ParseError::ExpressionTooDeep { span, .. }
            | ParseError::PatternMalformed { span, .. }
            | ParseError::UnsupportedClause { span, .. } => *span,
        }
    }
}

/// Compute the byte offset of `remaining` within `source`.
///
/// Every parser combinator in this crate only ever consumes from the
/// front of its input, so `remaining` is always a suffix of `source` and
/// the offset is simply the length difference; no pointer arithmetic or
/// a running counter threaded through every combinator is needed.
pub fn offset_of(source: &str, remaining: &str) -> usize {
    source.len() - remaining.len()
}

pub fn span_of(source: &str, remaining: &str) -> Span {
    let start = offset_of(source, remaining);
    Span::new(start, start)
}
