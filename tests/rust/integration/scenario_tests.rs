//! The six literal end-to-end scenarios spec.md §8 names, each driven
//! through the public `translate`/`validate` entry points.

use super::fixtures::{org_chart_schema, sign_in_schema, weighted_edge_schema};
use kqlgraph::{translate, validate, Config};

fn translate_ok(source: &str, schema: &kqlgraph::SchemaMap, config: &Config) -> String {
    translate(source, schema, config)
        .unwrap_or_else(|e| panic!("translation of {source:?} failed: {e:?}"))
        .kql
}

/// Scenario 1: single-hop with filter.
#[test]
fn single_hop_with_filter() {
    let schema = sign_in_schema();
    let config = Config::default();
    let kql = translate_ok(
        "MATCH (u:User)-[:LOGGED_IN]->(d:Device) WHERE u.department = 'Finance' RETURN u.name, d.hostname",
        &schema,
        &config,
    );
    assert!(kql.contains("make-graph"));
    assert!(kql.contains("Users"));
    assert!(kql.contains("Devices"));
    assert!(kql.contains("SignInLogs"));
    assert!(kql.contains("graph-match"));
    assert!(kql.contains("u.Department == 'Finance'"));
    assert!(kql.contains("project"));
    assert!(kql.contains("u.DisplayName"));
    assert!(kql.contains("d.Hostname"));
}

/// Scenario 2: variable-length path.
#[test]
fn variable_length_path() {
    let schema = org_chart_schema();
    let config = Config::default();
    let kql = translate_ok(
        "MATCH (a:User)-[:REPORTS_TO*1..3]->(b:User) WHERE a.name = 'Alice' RETURN b.name",
        &schema,
        &config,
    );
    assert!(kql.contains("graph-match"));
    assert!(kql.contains("REPORTS_TO*1..3") || kql.contains("REPORTS_TO*1..3]"));
    assert!(kql.contains("a.DisplayName == 'Alice'"));
    assert!(kql.contains("b.DisplayName"));
}

/// Scenario 3: weighted shortest path.
#[test]
fn weighted_shortest_path() {
    let schema = weighted_edge_schema();
    let config = Config::default();
    let kql = translate_ok(
        "MATCH p = shortestPath((s:Node)-[:EDGE*]-(t:Node)) WHERE s.id = 'X' AND t.id = 'Y' RETURN p",
        &schema,
        &config,
    );
    assert!(kql.contains("graph-shortest-paths"));
    assert!(kql.contains("weight=cost"));
    assert!(kql.contains("s.id == 'X'"));
    assert!(kql.contains("t.id == 'Y'"));
}

/// Scenario 4: filter pushdown - the equality predicate must land
/// inside the `graph-match` pattern, not as a separate `where` stage
/// above it.
#[test]
fn filter_pushdown_lands_inside_the_pattern() {
    let schema = sign_in_schema();
    let config = Config::default();
    let kql = translate_ok("MATCH (u:User) WHERE u.id = 42 RETURN u.name", &schema, &config);
    let graph_match_line = kql
        .lines()
        .find(|l| l.contains("graph-match"))
        .expect("a graph-match line");
    assert!(graph_match_line.contains("u.userId == 42") || graph_match_line.contains("userId == 42"));
    assert!(!kql.lines().any(|l| l.trim_start().starts_with("| where")));
}

/// Scenario 5: time-range injection on a source with a declared time
/// column and no explicit time filter in the query.
#[test]
fn time_range_injection_adds_default_window() {
    let schema = sign_in_schema();
    let config = Config::default();
    let kql = translate_ok(
        "MATCH (u:User)-[:LOGGED_IN]->(d:Device) WHERE u.department = 'Finance' RETURN u.name, d.hostname",
        &schema,
        &config,
    );
    assert!(kql.contains("TimeGenerated"));
    assert!(kql.contains("ago(7d)"));
}

/// Scenario 6: validator rejection of a candidate KQL missing a
/// source-query label. Table names are chosen so they share no
/// substring with the label itself - otherwise the candidate's
/// `with Identities on ...` clause would itself satisfy the
/// symbol-alignment check by accident (see `fixtures::alias_schema`).
#[test]
fn validator_rejects_candidate_missing_a_label() {
    let schema = super::fixtures::alias_schema();
    let config = Config::default();
    let source = "MATCH (u:User)-[:LOGGED_IN]->(d:Device) RETURN u.name, d.hostname";
    let candidate = r#"
Identities
| make-graph userId -[SignIns]-> deviceId with Identities on userId, Endpoints on deviceId, SignIns on (userId, deviceId)
| graph-match (u)-[:LOGGED_IN]->(d:Device) project u.DisplayName, d.Hostname
"#;
    let result = validate(source, candidate, &schema, &config);
    assert!(!result.is_valid);
    assert!(!result.errors.is_empty());
}
