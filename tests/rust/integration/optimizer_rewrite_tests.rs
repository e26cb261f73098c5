//! Exercises the optimizer's rule set (spec.md §4.E) through the full
//! pipeline: each config flag toggles its rule off independently, and
//! the rule-application log names exactly the rules that fired.

use super::fixtures::sign_in_schema;
use kqlgraph::{translate, Config};

const QUERY: &str =
    "MATCH (u:User)-[:LOGGED_IN]->(d:Device) WHERE u.department = 'Finance' RETURN u.name, d.hostname";

#[test]
fn disabling_time_range_injection_drops_the_ago_clause() {
    let schema = sign_in_schema();
    let mut config = Config::default();
    config.optimizer.enable_time_range = false;
    let kql = translate(QUERY, &schema, &config).unwrap().kql;
    assert!(!kql.contains("ago("));
}

#[test]
fn disabling_predicate_pushdown_keeps_the_filter_as_a_separate_stage() {
    let schema = sign_in_schema();
    let mut config = Config::default();
    config.optimizer.enable_predicate_pushdown = false;
    config.optimizer.enable_filter_pushdown = false;
    let kql = translate("MATCH (u:User) WHERE u.id = 42 RETURN u.name", &schema, &config)
        .unwrap()
        .kql;
    let graph_match_line = kql.lines().find(|l| l.contains("graph-match")).unwrap();
    assert!(!graph_match_line.contains("== 42"));
}

#[test]
fn optimizer_log_names_every_rule_that_fired() {
    let schema = sign_in_schema();
    let config = Config::default();
    let result = translate(QUERY, &schema, &config).unwrap();
    let rule_names: Vec<&str> = result.optimizer_log.iter().map(|r| r.rule.as_str()).collect();
    assert!(rule_names.contains(&"PredicatePushdown"));
    assert!(rule_names.contains(&"TimeRangeInjection"));
}

#[test]
fn index_hint_rule_annotates_an_indexed_equality_property() {
    let schema = sign_in_schema();
    let config = Config::default();
    // `sign_in_schema` marks `User.id` indexed.
    let result = translate("MATCH (u:User) WHERE u.id = 42 RETURN u.name", &schema, &config).unwrap();
    assert!(result
        .optimizer_log
        .iter()
        .any(|r| r.rule == "IndexHint"));
}

#[test]
fn all_rules_disabled_still_produces_valid_kql_with_an_empty_log() {
    let schema = sign_in_schema();
    let mut config = Config::default();
    config.optimizer.enable_filter_pushdown = false;
    config.optimizer.enable_predicate_pushdown = false;
    config.optimizer.enable_time_range = false;
    config.optimizer.enable_join_reorder = false;
    config.optimizer.enable_index_hints = false;
    let result = translate(QUERY, &schema, &config).unwrap();
    assert!(result.optimizer_log.is_empty());
    assert!(result.kql.contains("graph-match"));
}
