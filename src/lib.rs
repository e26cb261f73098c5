//! kqlgraph - source-to-source compiler translating openCypher-style graph
//! queries into Kusto Query Language (KQL) against Microsoft Sentinel's
//! `make-graph` / `graph-match` / `graph-shortest-paths` operators.
//!
//! The crate is organized the way the pipeline described in the design
//! documents flows: `parser` produces an AST, `schema` binds labels and
//! relationship types to concrete tables/columns, `plan` lowers the AST
//! (plus schema) into a small relational + graph algebra, `optimizer`
//! rewrites that plan under a cost model, and `emitter` serializes the
//! final plan to KQL text. `validator` is the independent counterpart
//! that checks externally supplied candidate KQL against a source query
//! instead of producing one.

/// Debug print macro that only compiles in debug builds.
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        log::trace!($($arg)*);
    };
}

pub mod config;
pub mod diagnostics;
pub mod emitter;
pub mod optimizer;
pub mod parser;
pub mod plan;
pub mod schema;
pub mod translate;
pub mod validator;

pub use config::Config;
pub use diagnostics::Diagnostic;
pub use schema::SchemaMap;
pub use translate::{translate, TranslateError, TranslationResult};
pub use validator::{validate, ValidationResult};
