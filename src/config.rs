//! Translation configuration.
//!
//! A single `Config` struct threaded explicitly through `translate`/
//! `validate`, rather than a process-wide default instance — the core
//! exposes no hidden configuration state (see design notes on global
//! defaults).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use validator::{Validate, ValidationError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// How KQL emitter should quote identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotePolicy {
    /// Quote an identifier only when it collides with a KQL keyword.
    Minimal,
    /// Always wrap identifiers in `[' ']` bracket quoting.
    Always,
}

impl Default for QuotePolicy {
    fn default() -> Self {
        QuotePolicy::Minimal
    }
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub enable_filter_pushdown: bool,
    pub enable_predicate_pushdown: bool,
    pub enable_time_range: bool,
    pub enable_join_reorder: bool,
    pub enable_index_hints: bool,
    #[validate(range(min = 1, max = 64, message = "max_iterations must be between 1 and 64"))]
    pub max_iterations: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enable_filter_pushdown: true,
            enable_predicate_pushdown: true,
            enable_time_range: true,
            enable_join_reorder: true,
            enable_index_hints: true,
            max_iterations: 16,
        }
    }
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct ParserConfig {
    #[validate(range(min = 1, max = 256, message = "max_depth must be between 1 and 256"))]
    pub max_depth: u32,
    /// Maximum accepted source length in bytes.
    #[validate(custom(function = "validate_max_query_bytes"))]
    pub max_query_bytes: usize,
}

fn validate_max_query_bytes(value: &usize) -> Result<(), ValidationError> {
    if *value == 0 {
        return Err(ValidationError::new("max_query_bytes must be positive"));
    }
    Ok(())
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_query_bytes: 128 * 1024,
        }
    }
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct EmitterConfig {
    pub quote_policy: QuotePolicy,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            quote_policy: QuotePolicy::Minimal,
        }
    }
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub strict: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { strict: false }
    }
}

/// Top-level configuration for a translation request.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct Config {
    #[validate(nested)]
    pub optimizer: OptimizerConfig,
    #[validate(nested)]
    pub parser: ParserConfig,
    #[validate(nested)]
    pub emitter: EmitterConfig,
    #[validate(nested)]
    pub validator: ValidatorConfig,
    /// Case sensitivity for `CONTAINS`/`STARTS WITH`/`ENDS WITH`. KQL's
    /// `has`/`startswith`/`endswith` default to case-insensitive; this
    /// flag lets a deployment opt into Cypher's case-sensitive semantics
    /// by emitting the `_cs` suffixed KQL operators instead.
    pub case_insensitive_text_ops: bool,
    /// Policy applied when a pattern filter references a property with
    /// no entry in the schema's property map.
    pub unmapped_property_policy: UnmappedPropertyPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPropertyPolicy {
    /// Raise `SchemaError::UnmappedProperty`.
    Error,
    /// Fall back to `column = prop`.
    Passthrough,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::default(),
            parser: ParserConfig::default(),
            emitter: EmitterConfig::default(),
            validator: ValidatorConfig::default(),
            case_insensitive_text_ops: true,
            unmapped_property_policy: UnmappedPropertyPolicy::Error,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file alongside the schema file.
    /// This is ambient config-and-validation plumbing, not a CLI entry
    /// point: the HTTP/CLI front-end is out of scope for this crate.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert!(config.optimizer.enable_filter_pushdown);
        assert!(config.optimizer.enable_predicate_pushdown);
        assert!(config.optimizer.enable_time_range);
        assert!(config.optimizer.enable_join_reorder);
        assert!(config.optimizer.enable_index_hints);
        assert_eq!(config.optimizer.max_iterations, 16);
        assert_eq!(config.parser.max_depth, 64);
        assert_eq!(config.parser.max_query_bytes, 128 * 1024);
        assert_eq!(config.emitter.quote_policy, QuotePolicy::Minimal);
        assert!(!config.validator.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_max_iterations() {
        let mut config = Config::default();
        config.optimizer.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_yaml() {
        let yaml = r#"
optimizer:
  enable_filter_pushdown: true
  enable_predicate_pushdown: true
  enable_time_range: false
  enable_join_reorder: true
  enable_index_hints: true
  max_iterations: 8
parser:
  max_depth: 32
  max_query_bytes: 65536
emitter:
  quote_policy: always
validator:
  strict: true
case_insensitive_text_ops: false
unmapped_property_policy: passthrough
"#;
        let config = Config::from_yaml_str(yaml).expect("valid config");
        assert_eq!(config.optimizer.max_iterations, 8);
        assert!(!config.optimizer.enable_time_range);
        assert_eq!(config.emitter.quote_policy, QuotePolicy::Always);
        assert!(config.validator.strict);
    }
}
