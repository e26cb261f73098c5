//! Shared schema fixtures for the integration suite, mirroring the
//! literal schema snippets spec.md §8's end-to-end scenarios describe.

use kqlgraph::schema::SchemaMap;

/// Users/Devices/SignInLogs, as used in spec.md §8 scenarios 1, 4, and 5
/// (single-hop with filter, filter pushdown, time-range injection).
pub fn sign_in_schema() -> SchemaMap {
    SchemaMap::from_yaml_str(
        r#"
node_mappings:
  User:
    table: Users
    key: userId
    properties:
      name: DisplayName
      department: Department
      id: userId
    indexed: [id]
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
    time_column: TimeGenerated
    properties: {}
options:
  default_time_window: 7d
"#,
    )
    .expect("sign_in_schema is valid")
}

/// A self-referential `User` hierarchy for variable-length path
/// scenarios (spec.md §8 scenario 2, `REPORTS_TO*1..3`).
pub fn org_chart_schema() -> SchemaMap {
    SchemaMap::from_yaml_str(
        r#"
node_mappings:
  User:
    table: Users
    key: userId
    properties:
      name: DisplayName
relationship_mappings:
  REPORTS_TO:
    table: ReportsTo
    source: userId
    target: managerId
    properties: {}
"#,
    )
    .expect("org_chart_schema is valid")
}

/// A weighted `Node`/`EDGE` graph for shortest-path scenarios (spec.md
/// §8 scenario 3).
pub fn weighted_edge_schema() -> SchemaMap {
    SchemaMap::from_yaml_str(
        r#"
node_mappings:
  Node:
    table: Nodes
    key: id
    properties:
      id: id
relationship_mappings:
  EDGE:
    table: Edges
    source: srcId
    target: dstId
    properties: {}
    weight_property: cost
"#,
    )
    .expect("weighted_edge_schema is valid")
}

/// `User`/`Device`/`LOGGED_IN` bound to table names that share no
/// substring with the label/rel-type itself, so symbol-alignment
/// tests can't accidentally pass by matching the table name instead of
/// the pattern's own label text.
pub fn alias_schema() -> SchemaMap {
    SchemaMap::from_yaml_str(
        r#"
node_mappings:
  User:
    table: Identities
    key: userId
    properties:
      name: DisplayName
  Device:
    table: Endpoints
    key: deviceId
    properties:
      hostname: Hostname
relationship_mappings:
  LOGGED_IN:
    table: SignIns
    source: userId
    target: deviceId
    properties: {}
"#,
    )
    .expect("alias_schema is valid")
}
