//! The crate's public entry point: wires components A through F into
//! the pure function spec.md §6 names - `(source, schema, config) ->
//! (kql, diagnostics, optimizer_log)`.
//!
//! Mirrors the teacher's own top-level `query_planner` orchestration
//! (parse -> plan -> optimize -> render), but as a single free function
//! rather than a struct with mutable session state, since this crate
//! holds no process-wide state between calls (design notes, "global
//! default instances"). `translate_checked` additionally exposes the
//! four phase boundaries spec.md §5 names so a caller can poll a
//! deadline between phases; `translate` is the common case that never
//! cancels.

use crate::config::Config;
use crate::diagnostics::{Diagnostic, Phase, Span};
use crate::emitter::{self, EmitError};
use crate::optimizer::{self, RuleApplication};
use crate::parser::ast::{CypherStatement, Query, UnionType};
use crate::parser::{self, strip_comments, ParseError};
use crate::plan::{self, PlanError};
use crate::schema::{SchemaError, SchemaMap};
use thiserror::Error;

/// A successful translation: the emitted KQL text plus every
/// non-fatal diagnostic (optimizer warnings, fallback notices) and the
/// optimizer's rule-application log, per spec.md §6.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub kql: String,
    pub diagnostics: Vec<Diagnostic>,
    pub optimizer_log: Vec<RuleApplication>,
}

/// The aggregate failure spec.md §7 describes: "the top-level entry
/// point returns either a successful translation with warnings or a
/// single aggregate failure with the first fatal error and all
/// accumulated warnings."
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslateError {
    #[error("{}", .diagnostic.message)]
    Fatal {
        diagnostic: Diagnostic,
        warnings: Vec<Diagnostic>,
    },
    #[error("translation cancelled by caller after the {} phase", .phase.as_str())]
    Cancelled {
        phase: Phase,
        warnings: Vec<Diagnostic>,
    },
}

impl TranslateError {
    /// The first fatal diagnostic, when this is not a cancellation.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            TranslateError::Fatal { diagnostic, .. } => Some(diagnostic),
            TranslateError::Cancelled { .. } => None,
        }
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        match self {
            TranslateError::Fatal { warnings, .. } => warnings,
            TranslateError::Cancelled { warnings, .. } => warnings,
        }
    }
}

/// Translate a single Cypher source query into KQL against `schema`
/// under `config`. Never cancels; equivalent to `translate_checked`
/// with an always-continue probe.
pub fn translate(
    source: &str,
    schema: &SchemaMap,
    config: &Config,
) -> Result<TranslationResult, TranslateError> {
    translate_checked(source, schema, config, |_phase| true)
}

/// Translate, polling `should_continue` between each phase boundary
/// (spec.md §5: "the core exposes the phase boundaries so a caller can
/// check a deadline between phases"). `should_continue` receives the
/// phase that just completed; returning `false` aborts with
/// `TranslateError::Cancelled` and whatever warnings had already
/// accumulated.
pub fn translate_checked(
    source: &str,
    schema: &SchemaMap,
    config: &Config,
    mut should_continue: impl FnMut(Phase) -> bool,
) -> Result<TranslationResult, TranslateError> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut optimizer_log: Vec<RuleApplication> = Vec::new();

    log::debug!("translate: source is {} bytes", source.len());

    let cleaned = strip_comments(source);
    let statement = parser::parse(&cleaned, config.parser.max_query_bytes, config.parser.max_depth)
        .map_err(|e| {
            log::warn!("translate: parse failed: {e}");
            TranslateError::Fatal {
                diagnostic: parse_error_diagnostic(&cleaned, &e),
                warnings: diagnostics.clone(),
            }
        })?;
    log::debug!(
        "translate: parsed {} reading clause(s) plus {} union branch(es)",
        statement.query.reading_clauses.len(),
        statement.unions.len()
    );

    if !should_continue(Phase::Parse) {
        return Err(TranslateError::Cancelled {
            phase: Phase::Parse,
            warnings: diagnostics,
        });
    }

    let kql = translate_statement(
        &statement,
        schema,
        config,
        &mut diagnostics,
        &mut optimizer_log,
        &mut should_continue,
    )?;

    log::info!(
        "translate: emitted {} bytes of KQL, {} rule application(s), {} diagnostic(s)",
        kql.len(),
        optimizer_log.len(),
        diagnostics.len()
    );

    Ok(TranslationResult {
        kql,
        diagnostics,
        optimizer_log,
    })
}

/// Lower every branch of the statement (the main query plus any
/// `UNION`/`UNION ALL` branches) independently and join the resulting
/// KQL text, since spec.md's plan algebra has no `Union` node (see
/// `plan::builder`'s module doc).
fn translate_statement<'a>(
    statement: &CypherStatement<'a>,
    schema: &SchemaMap,
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
    optimizer_log: &mut Vec<RuleApplication>,
    should_continue: &mut impl FnMut(Phase) -> bool,
) -> Result<String, TranslateError> {
    let mut needs_distinct = false;
    let mut branches = Vec::with_capacity(1 + statement.unions.len());

    branches.push(translate_query_body(
        &statement.query,
        schema,
        config,
        diagnostics,
        optimizer_log,
        should_continue,
    )?);

    for union in &statement.unions {
        if union.union_type == UnionType::Distinct {
            needs_distinct = true;
        }
        branches.push(translate_query_body(
            &union.query,
            schema,
            config,
            diagnostics,
            optimizer_log,
            should_continue,
        )?);
    }

    if branches.len() == 1 {
        return Ok(branches.into_iter().next().expect("exactly one branch"));
    }

    let mut iter = branches.into_iter();
    let mut kql = format!("({})", iter.next().expect("at least one branch"));
    for branch in iter {
        kql.push_str("\n| union (");
        kql.push_str(&branch);
        kql.push(')');
    }
    if needs_distinct {
        kql.push_str("\n| distinct *");
    }
    Ok(kql)
}

/// Lower one query body through plan -> optimize -> emit, checking the
/// `Plan`, `Optimize`, and `Emit` phase boundaries as it goes.
fn translate_query_body<'a>(
    query: &Query<'a>,
    schema: &SchemaMap,
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
    optimizer_log: &mut Vec<RuleApplication>,
    should_continue: &mut impl FnMut(Phase) -> bool,
) -> Result<String, TranslateError> {
    let plan = plan::build_plan(query, schema, config).map_err(|e| TranslateError::Fatal {
        diagnostic: plan_error_diagnostic(&e),
        warnings: diagnostics.clone(),
    })?;

    if !should_continue(Phase::Plan) {
        return Err(TranslateError::Cancelled {
            phase: Phase::Plan,
            warnings: diagnostics.clone(),
        });
    }

    let (plan, mut rule_log, mut opt_diagnostics) = optimizer::optimize(plan, schema, &config.optimizer);
    diagnostics.append(&mut opt_diagnostics);
    optimizer_log.append(&mut rule_log);

    if !should_continue(Phase::Optimize) {
        return Err(TranslateError::Cancelled {
            phase: Phase::Optimize,
            warnings: diagnostics.clone(),
        });
    }

    let kql = emitter::emit(&plan, schema, config).map_err(|e| TranslateError::Fatal {
        diagnostic: emit_error_diagnostic(&e),
        warnings: diagnostics.clone(),
    })?;

    if !should_continue(Phase::Emit) {
        return Err(TranslateError::Cancelled {
            phase: Phase::Emit,
            warnings: diagnostics.clone(),
        });
    }

    Ok(kql)
}

fn parse_error_diagnostic(source: &str, err: &ParseError) -> Diagnostic {
    let code = match err {
        ParseError::EmptyQuery => "parse-empty-query",
        ParseError::TooLarge { .. } => "parse-too-large",
        ParseError::UnexpectedToken { .. } => "parse-unexpected-token",
        ParseError::UnterminatedString { .. } => "parse-unterminated-string",
        ParseError::UnknownEscape { .. } => "parse-unknown-escape",
        ParseError::TrailingInput { .. } => "parse-trailing-input",
        ParseError::ExpressionTooDeep { .. } => "parse-expression-too-deep",
        ParseError::PatternMalformed { .. } => "parse-pattern-malformed",
        ParseError::UnsupportedClause { .. } => "parse-unsupported-clause",
    };
    let diagnostic = Diagnostic::error(code, err.to_string());
    let span = err.span();
    if span == Span::none() {
        diagnostic
    } else {
        let (line, col) = span.line_col(source);
        diagnostic
            .with_span(span)
            .with_hint(format!("line {line}, column {col}"))
    }
}

fn schema_error_code(err: &SchemaError) -> &'static str {
    match err {
        SchemaError::UnboundLabel { .. } => "schema-unbound-label",
        SchemaError::UnboundRelType { .. } => "schema-unbound-rel-type",
        SchemaError::UnmappedProperty { .. } => "schema-unmapped-property",
        SchemaError::DanglingSourceKey { .. } => "schema-dangling-source-key",
        SchemaError::DanglingTargetKey { .. } => "schema-dangling-target-key",
        SchemaError::DuplicateLabel { .. } => "schema-duplicate-label",
        SchemaError::DuplicateRelType { .. } => "schema-duplicate-rel-type",
        SchemaError::MissingWeightProperty { .. } => "schema-missing-weight-property",
        SchemaError::InvalidDocument { .. } => "schema-invalid-document",
    }
}

fn plan_error_diagnostic(err: &PlanError) -> Diagnostic {
    let code = match err {
        PlanError::Schema(inner) => schema_error_code(inner),
        PlanError::UnboundVariable { .. } => "plan-unbound-variable",
        PlanError::UnsupportedConstruct { .. } => "plan-unsupported-construct",
        PlanError::PatternMalformed { .. } => "plan-pattern-malformed",
        PlanError::MissingWeightProperty { .. } => "plan-missing-weight-property",
        PlanError::NonPositiveMaxLength => "plan-non-positive-max-length",
        PlanError::TooManyNodes { .. } => "plan-too-many-nodes",
    };
    Diagnostic::error(code, err.to_string())
}

fn emit_error_diagnostic(err: &EmitError) -> Diagnostic {
    // Assertion class (spec.md §7.5): an invariant the builder/optimizer
    // should have already enforced, not a user-facing input error.
    let code = match err {
        EmitError::EmptyGraphDef => "emitter-empty-graph-def",
        EmitError::UnsupportedJoinShape => "emitter-unsupported-join-shape",
        EmitError::UnboundVariable { .. } => "emitter-unbound-variable",
    };
    Diagnostic::error(code, err.to_string())
        .with_hint("this indicates a plan-builder or optimizer defect, not a malformed query")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> SchemaMap {
        SchemaMap::from_yaml_str(
            r#"
node_mappings:
  User:
    table: Users
    key: userId
    properties:
      department: Department
      name: DisplayName
  Device:
    table: Devices
    key: deviceId
    properties:
      hostname: Hostname
relationship_mappings:
  LOGGED_IN:
    table: SignInLogs
    source: userId
    target: deviceId
    properties: {}
"#,
        )
        .unwrap()
    }

    #[test]
    fn translates_single_hop_with_filter() {
        let schema = sample_schema();
        let config = Config::default();
        let result = translate(
            "MATCH (u:User)-[:LOGGED_IN]->(d:Device) WHERE u.department = 'Finance' RETURN u.name, d.hostname",
            &schema,
            &config,
        )
        .expect("translation succeeds");
        assert!(result.kql.contains("make-graph"));
        assert!(result.kql.contains("graph-match"));
        assert!(result.kql.contains("u.Department == 'Finance'"));
        assert!(result.kql.contains("project"));
    }

    #[test]
    fn is_deterministic_across_repeated_calls() {
        let schema = sample_schema();
        let config = Config::default();
        let source = "MATCH (u:User)-[:LOGGED_IN]->(d:Device) WHERE u.department = 'Finance' RETURN u.name";
        let first = translate(source, &schema, &config).unwrap();
        for _ in 0..50 {
            let again = translate(source, &schema, &config).unwrap();
            assert_eq!(first.kql, again.kql);
        }
    }

    #[test]
    fn empty_query_is_a_fatal_diagnostic() {
        let schema = sample_schema();
        let config = Config::default();
        let err = translate("   ", &schema, &config).unwrap_err();
        let diagnostic = err.diagnostic().expect("fatal error");
        assert_eq!(diagnostic.code, "parse-empty-query");
        assert!(err.warnings().is_empty());
    }

    #[test]
    fn unbound_label_is_a_fatal_diagnostic() {
        let schema = sample_schema();
        let config = Config::default();
        let err = translate("MATCH (g:Ghost) RETURN g", &schema, &config).unwrap_err();
        let diagnostic = err.diagnostic().expect("fatal error");
        assert_eq!(diagnostic.code, "schema-unbound-label");
    }

    #[test]
    fn cancellation_after_parse_phase_is_reported() {
        let schema = sample_schema();
        let config = Config::default();
        let err = translate_checked(
            "MATCH (u:User) RETURN u.name",
            &schema,
            &config,
            |phase| phase != Phase::Parse,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Cancelled {
                phase: Phase::Parse,
                ..
            }
        ));
    }

    #[test]
    fn union_all_branches_join_with_union_operator() {
        let schema = sample_schema();
        let config = Config::default();
        let result = translate(
            "MATCH (a:User) RETURN a.name UNION ALL MATCH (b:User) RETURN b.name",
            &schema,
            &config,
        )
        .unwrap();
        assert!(result.kql.contains("| union ("));
        assert!(!result.kql.contains("| distinct *"));
    }

    #[test]
    fn union_distinct_branches_append_distinct_stage() {
        let schema = sample_schema();
        let config = Config::default();
        let result = translate(
            "MATCH (a:User) RETURN a.name UNION MATCH (b:User) RETURN b.name",
            &schema,
            &config,
        )
        .unwrap();
        assert!(result.kql.contains("| distinct *"));
    }
}
