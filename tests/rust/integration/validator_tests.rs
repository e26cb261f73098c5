//! spec.md §8's "validator soundness" property plus a handful of the
//! five individual checks §4.G names, driven against real translated
//! output and hand-written candidates.

use super::fixtures::sign_in_schema;
use kqlgraph::{translate, validate, Config};

const QUERY: &str =
    "MATCH (u:User)-[:LOGGED_IN]->(d:Device) WHERE u.department = 'Finance' RETURN u.name, d.hostname";

#[test]
fn validator_soundness_accepts_its_own_deterministic_translation() {
    let schema = sign_in_schema();
    let config = Config::default();
    let translated = translate(QUERY, &schema, &config).unwrap();
    let result = validate(QUERY, &translated.kql, &schema, &config);
    assert!(result.is_valid, "errors: {:?}", result.errors);
    assert!(result.confidence >= 0.9, "confidence was {}", result.confidence);
}

#[test]
fn unbalanced_parentheses_fail_the_syntactic_check() {
    let schema = sign_in_schema();
    let config = Config::default();
    let result = validate(QUERY, "Users\n| make-graph (unbalanced", &schema, &config);
    assert!(!result.is_valid);
    assert!(!result.errors.is_empty());
}

#[test]
fn unknown_table_reference_fails_schema_resolution() {
    let schema = sign_in_schema();
    let config = Config::default();
    let candidate = "NotARealTable\n| make-graph userId -[SignInLogs]-> deviceId with NotARealTable on userId\n| graph-match (u:User)-[:LOGGED_IN]->(d:Device) project u.DisplayName, d.Hostname";
    let result = validate(QUERY, candidate, &schema, &config);
    assert!(!result.is_valid);
}

#[test]
fn projection_arity_mismatch_is_flagged() {
    let schema = sign_in_schema();
    let config = Config::default();
    let candidate = "Users\n| make-graph userId -[SignInLogs]-> deviceId with Users on userId, Devices on deviceId, SignInLogs on (userId, deviceId)\n| graph-match (u:User)-[:LOGGED_IN]->(d:Device) project u.DisplayName";
    let result = validate(QUERY, candidate, &schema, &config);
    assert!(!result.is_valid);
}

#[test]
fn strict_mode_is_stricter_than_the_default() {
    let schema = sign_in_schema();
    let mut lenient = Config::default();
    lenient.validator.strict = false;
    let mut strict = Config::default();
    strict.validator.strict = true;

    let candidate = "Users\n| make-graph userId -[SignInLogs]-> deviceId with Users on userId, Devices on deviceId, SignInLogs on (userId, deviceId)\n| graph-match (u:User)-[:LOGGED_IN]->(d:Device) project u.DisplayName";

    let lenient_result = validate(QUERY, candidate, &schema, &lenient);
    let strict_result = validate(QUERY, candidate, &schema, &strict);
    assert!(strict_result.confidence <= lenient_result.confidence);
}

#[test]
fn validator_never_executes_kql_and_always_returns_a_structured_result() {
    let schema = sign_in_schema();
    let config = Config::default();
    // Garbage that is not even well-formed KQL still gets a structured
    // non-panicking result, never raises.
    let result = validate(QUERY, "this is not kql at all !!!", &schema, &config);
    assert!(!result.is_valid);
}
