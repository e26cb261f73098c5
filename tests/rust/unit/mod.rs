//! Unit tests exercising individual components (parser, schema mapper,
//! cost model) in isolation, as opposed to the full translation
//! pipeline covered by `tests/rust/integration`.
//!
//! Most component-level unit tests live inline as `#[cfg(test)] mod
//! tests` next to the code they exercise (parser, schema, optimizer,
//! emitter) per the teacher's own convention. This harness adds
//! black-box coverage of error-handling edge cases that are easier to
//! express against the public API than from inside a single module.

mod parser_robustness_tests;
mod schema_mapper_tests;
