//! Black-box coverage of the schema mapper's resolution contract
//! (spec.md §4.C): pure, deterministic, and honoring the configured
//! unmapped-property fallback.

use kqlgraph::schema::{PropertyResolution, SchemaError, SchemaMap};

fn schema_with_policy(policy: &str) -> SchemaMap {
    SchemaMap::from_yaml_str(&format!(
        r#"
node_mappings:
  User:
    table: Users
    key: userId
    properties:
      name: DisplayName
relationship_mappings: {{}}
options:
  unmapped_property_policy: {policy}
"#
    ))
    .expect("schema parses")
}

#[test]
fn unbound_label_and_rel_type_are_reported_distinctly() {
    let schema = schema_with_policy("error");
    assert!(matches!(
        schema.resolve_label("Ghost"),
        Err(SchemaError::UnboundLabel { .. })
    ));
    assert!(matches!(
        schema.resolve_rel("GHOST_REL"),
        Err(SchemaError::UnboundRelType { .. })
    ));
}

#[test]
fn unmapped_property_policy_error_reports_unmapped() {
    let schema = schema_with_policy("error");
    assert!(matches!(
        schema.resolve_node_property("User", "nickname"),
        PropertyResolution::Unmapped
    ));
}

#[test]
fn unmapped_property_policy_passthrough_falls_back_to_the_property_name() {
    let schema = schema_with_policy("passthrough");
    match schema.resolve_node_property("User", "nickname") {
        PropertyResolution::Passthrough(col) => assert_eq!(col, "nickname"),
        other => panic!("expected passthrough, got a different resolution (debug: {:?})", std::mem::discriminant(&other)),
    }
}

#[test]
fn resolution_is_pure_and_repeatable() {
    let schema = schema_with_policy("error");
    let first = schema.resolve_label("User").unwrap().table.clone();
    for _ in 0..20 {
        assert_eq!(schema.resolve_label("User").unwrap().table, first);
    }
}

#[test]
fn loading_invalid_yaml_is_a_structured_schema_error() {
    let err = SchemaMap::from_yaml_str("not: [valid, schema").unwrap_err();
    assert!(matches!(err, SchemaError::InvalidDocument { .. }));
}
