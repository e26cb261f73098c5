//! Structured diagnostics shared across every phase of translation.
//!
//! `Diagnostic` is the single user-facing shape: parse errors, schema
//! errors, optimizer warnings, and validator findings all render down to
//! it at the top-level `translate`/`validate` boundary, per the error
//! taxonomy in the design notes. Internal phases keep their own typed
//! error enums (`ParseError`, `SchemaError`, `PlanError`, ...) and only
//! convert to `Diagnostic` when they cross that boundary.

use serde::{Deserialize, Serialize};

/// A byte-offset span into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A span that does not point at a specific location in the source.
    pub fn none() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Resolve this byte-offset span into 1-based (line, column) pairs
    /// against `source`. Resolution is deferred until a diagnostic is
    /// actually materialized, rather than tracked eagerly while parsing.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let mut line = 1usize;
        let mut col = 1usize;
        for (offset, ch) in source.char_indices() {
            if offset >= self.start {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub span: Option<Span>,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            span: None,
            hint: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            span: None,
            hint: None,
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code: code.into(),
            message: message.into(),
            span: None,
            hint: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// The four phase boundaries a caller may check a deadline/cancellation
/// probe between. Translation itself has no suspension points; this is
/// purely a set of named checkpoints a caller-supplied `should_continue`
/// probe gets polled at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Plan,
    Optimize,
    Emit,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Plan => "plan",
            Phase::Optimize => "optimize",
            Phase::Emit => "emit",
        }
    }
}
