//! Cypher scalar/aggregate function name -> KQL function name mapping.
//!
//! A small registry built once via `LazyLock` (this crate's stand-in
//! for the teacher's `lazy_static!`), the same function-bridge pattern
//! the teacher uses in its ClickHouse SQL generator to translate
//! Cypher/Neo4j builtins into the target dialect's builtins. Lookup is
//! case-insensitive: Cypher spells these `toUpper`/`toInteger`, KQL
//! spells them lowercase.

use std::collections::HashMap;
use std::sync::LazyLock;

pub static FUNCTION_REGISTRY: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("toupper", "toupper"),
        ("tolower", "tolower"),
        ("tostring", "tostring"),
        ("tointeger", "toint"),
        ("tofloat", "toreal"),
        ("toboolean", "tobool"),
        ("size", "array_length"),
        ("count", "count"),
        ("collect", "make_list"),
        ("sum", "sum"),
        ("avg", "avg"),
        ("min", "min"),
        ("max", "max"),
        ("abs", "abs"),
        ("ceil", "ceiling"),
        ("floor", "floor"),
        ("round", "round"),
        ("sqrt", "sqrt"),
        ("trim", "trim"),
        ("ltrim", "trim_start"),
        ("rtrim", "trim_end"),
        ("split", "split"),
        ("replace", "replace_string"),
        ("substring", "substring"),
        ("coalesce", "coalesce"),
        ("length", "strlen"),
        ("timestamp", "now"),
    ])
});

/// Resolve a Cypher function name to its KQL equivalent, falling back
/// to the lowercased source name when the registry has no mapping
/// (KQL and Cypher happen to share spelling for a number of scalar
/// functions this registry does not need to list explicitly).
pub fn resolve(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match FUNCTION_REGISTRY.get(lower.as_str()) {
        Some(kql_name) => kql_name.to_string(),
        None => lower,
    }
}
