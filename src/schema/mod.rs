//! The schema mapper: binds abstract graph labels and relationship
//! types to concrete Sentinel tables, columns, and join keys.
//!
//! The document is deserialized with `serde` + `serde_yaml`, matching
//! the teacher's YAML-driven `graph_catalog` schema loader. Resolution
//! (`resolve_label`/`resolve_rel`/`resolve_property`) is pure and
//! deterministic: the same schema and the same label/type/property
//! always resolve identically, which is what lets `translate` promise
//! "same source + same schema + same config -> same plan".

pub mod errors;
mod validator;

pub use errors::SchemaError;
pub use validator::SchemaValidator;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPropertyPolicy {
    Error,
    Passthrough,
}

impl Default for UnmappedPropertyPolicy {
    fn default() -> Self {
        UnmappedPropertyPolicy::Error
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaOptions {
    /// Default lookback window injected by `TimeRangeInjection`, e.g. `"7d"`.
    pub default_time_window: Option<String>,
    #[serde(default = "default_true")]
    pub case_insensitive_text_ops: bool,
    #[serde(default)]
    pub unmapped_property_policy: UnmappedPropertyPolicy,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            default_time_window: None,
            case_insensitive_text_ops: true,
            unmapped_property_policy: UnmappedPropertyPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelBinding {
    pub table: String,
    pub key: String,
    pub time_column: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub indexed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelBinding {
    pub table: String,
    pub source: String,
    pub target: String,
    pub time_column: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub indexed: Vec<String>,
    pub weight_property: Option<String>,
}

/// The immutable schema snapshot threaded through a translation. Loaded
/// once per translation request; two translations against the same
/// `SchemaMap` value always resolve identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaMap {
    pub node_mappings: HashMap<String, LabelBinding>,
    pub relationship_mappings: HashMap<String, RelBinding>,
    #[serde(default)]
    pub options: SchemaOptions,
}

pub enum PropertyResolution<'a> {
    Mapped(&'a str),
    /// Unmapped, but the fallback policy is `passthrough`: use the
    /// property name verbatim as the column name.
    Passthrough(&'a str),
    Unmapped,
}

impl SchemaMap {
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(text).map_err(|e| SchemaError::InvalidDocument {
            message: e.to_string(),
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let text = fs::read_to_string(path).map_err(|e| SchemaError::InvalidDocument {
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&text)
    }

    /// Resolve a node label to its table/column binding.
    pub fn resolve_label(&self, label: &str) -> Result<&LabelBinding, SchemaError> {
        self.node_mappings
            .get(label)
            .ok_or_else(|| SchemaError::UnboundLabel {
                label: label.to_string(),
            })
    }

    /// Resolve a relationship type to its table/column binding.
    pub fn resolve_rel(&self, rel_type: &str) -> Result<&RelBinding, SchemaError> {
        self.relationship_mappings
            .get(rel_type)
            .ok_or_else(|| SchemaError::UnboundRelType {
                rel_type: rel_type.to_string(),
            })
    }

    /// Resolve a property name against a node label's property map,
    /// honoring the unmapped-property fallback policy.
    pub fn resolve_node_property<'a>(&'a self, label: &str, prop: &'a str) -> PropertyResolution<'a> {
        match self.node_mappings.get(label) {
            Some(binding) => self.resolve_property_map(&binding.properties, prop),
            None => PropertyResolution::Unmapped,
        }
    }

    pub fn resolve_rel_property<'a>(&'a self, rel_type: &str, prop: &'a str) -> PropertyResolution<'a> {
        match self.relationship_mappings.get(rel_type) {
            Some(binding) => self.resolve_property_map(&binding.properties, prop),
            None => PropertyResolution::Unmapped,
        }
    }

    fn resolve_property_map<'a>(
        &'a self,
        properties: &'a HashMap<String, String>,
        prop: &'a str,
    ) -> PropertyResolution<'a> {
        if let Some(column) = properties.get(prop) {
            return PropertyResolution::Mapped(column);
        }
        match self.options.unmapped_property_policy {
            UnmappedPropertyPolicy::Passthrough => PropertyResolution::Passthrough(prop),
            UnmappedPropertyPolicy::Error => PropertyResolution::Unmapped,
        }
    }

    pub fn is_node_property_indexed(&self, label: &str, prop: &str) -> bool {
        self.node_mappings
            .get(label)
            .map(|b| b.indexed.iter().any(|p| p == prop))
            .unwrap_or(false)
    }

    pub fn is_rel_property_indexed(&self, rel_type: &str, prop: &str) -> bool {
        self.relationship_mappings
            .get(rel_type)
            .map(|b| b.indexed.iter().any(|p| p == prop))
            .unwrap_or(false)
    }
}
